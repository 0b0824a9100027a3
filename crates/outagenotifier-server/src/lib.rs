//! Watcher: snapshot change detection, scheduler, notifications.
//!
//! This crate runs the outage poll loop:
//! - Change detection against the accepted on-disk snapshot
//! - A fixed-interval scheduler that never overlaps cycles
//! - Desktop pop-ups for state transitions only
//!
//! # Example
//!
//! ```rust,no_run
//! use outagenotifier_core::Classifier;
//! use outagenotifier_providers::{FeedClient, FeedClientConfig, FeedFormat, FeedIngestor, ResolvedMarker};
//! use outagenotifier_server::{PollCycle, SnapshotStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FeedClient::new(FeedClientConfig::new("https://calendar.example.org/outages.ics")?)?;
//! let ingestor = FeedIngestor::new(Box::new(client), FeedFormat::Ical, "/var/lib/outages", ResolvedMarker::default());
//! let cycle = PollCycle::new(ingestor, SnapshotStore::new("/var/lib/outages"), Classifier::default());
//!
//! if cycle.refresh().await? {
//!     println!("feed changed");
//! }
//! # Ok(())
//! # }
//! ```

mod cycle;
mod error;
mod notify;
mod scheduler;
mod snapshot;

pub use cycle::{CycleOutcome, PollCycle};
pub use error::{ServerError, ServerResult};
pub use notify::{DesktopSink, NotifyConfig, NotifyEngine, PopupSink, buckets_fingerprint};
pub use scheduler::{DEFAULT_UPDATE_INTERVAL, Scheduler, SchedulerConfig, SchedulerHandle};
pub use snapshot::{SNAPSHOT_FILE_NAME, SnapshotStore};
