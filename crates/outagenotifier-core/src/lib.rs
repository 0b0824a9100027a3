//! Core types: outage records, date ranges, classification, formatting

pub mod classify;
pub mod daterange;
pub mod error;
pub mod format;
pub mod record;
pub mod status;
pub mod tracing;

pub use classify::{Buckets, Classifier, DEFAULT_SCOPE_AHEAD, DEFAULT_SCOPE_PAST};
pub use daterange::{DateRange, DateRangeParser};
pub use error::{CoreError, CoreResult};
pub use format::{ConsoleFormatter, Popup, format_date, popups, status_text};
pub use record::{NO_TIME, OutageRecord, sanitize_title};
pub use status::{DisplayState, OutageStatus, StateDisplay, Urgency};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
