//! One poll cycle: ingest, change gate, classify.

use outagenotifier_core::{Buckets, Classifier};
use outagenotifier_providers::FeedIngestor;
use tracing::{debug, info};

use crate::error::ServerResult;
use crate::snapshot::SnapshotStore;

/// Result of a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Whether the normalized feed differed from the accepted snapshot.
    pub feed_changed: bool,
    /// The accepted snapshot classified at the cycle's `now`.
    pub buckets: Buckets,
}

/// Glues the ingestor, the snapshot store and the classifier together.
pub struct PollCycle {
    ingestor: FeedIngestor,
    store: SnapshotStore,
    classifier: Classifier,
}

impl PollCycle {
    pub fn new(ingestor: FeedIngestor, store: SnapshotStore, classifier: Classifier) -> Self {
        Self {
            ingestor,
            store,
            classifier,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Fetches and normalizes the feed, then offers it to the snapshot
    /// store. Returns whether the accepted snapshot changed.
    ///
    /// # Errors
    ///
    /// A fetch error returns before the raw cache or the snapshot are
    /// touched.
    pub async fn refresh(&self) -> ServerResult<bool> {
        let records = self.ingestor.ingest().await?;
        let changed = self.store.accept(&records)?;
        if changed {
            info!(count = records.len(), "Outage feed changed");
        } else {
            debug!(count = records.len(), "Outage feed unchanged");
        }
        Ok(changed)
    }

    /// Classifies the accepted snapshot at `now` (unix seconds).
    pub fn classify_snapshot(&self, now: i64) -> ServerResult<Buckets> {
        let records = self.store.load()?;
        Ok(self.classifier.classify(&records, now)?)
    }

    /// Runs a full cycle.
    ///
    /// Classification runs even when the feed is unchanged, since outages
    /// move between buckets as time passes.
    pub async fn run(&self, now: i64) -> ServerResult<CycleOutcome> {
        let feed_changed = self.refresh().await?;
        let buckets = self.classify_snapshot(now)?;
        Ok(CycleOutcome {
            feed_changed,
            buckets,
        })
    }
}
