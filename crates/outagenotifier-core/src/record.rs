//! The canonical outage record.
//!
//! Every feed shape is normalized into an [`OutageRecord`] before it reaches
//! the change detector or the classifier. Records are rebuilt from scratch on
//! every poll and never mutated afterwards.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Sentinel for "no defined end time" and "no modification time".
pub const NO_TIME: i64 = 0;

static UNSAFE_TITLE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("Invalid title regex"));

/// Replaces every character outside `[A-Za-z0-9_\s]` with an underscore.
pub fn sanitize_title(text: &str) -> String {
    UNSAFE_TITLE_CHARS.replace_all(text, "_").into_owned()
}

/// One outage, normalized and independent of the feed it came from.
///
/// `end_time` and `mod_time` use [`NO_TIME`] (`0`) as "not available"; it is
/// never a real epoch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutageRecord {
    title: String,
    start_time: i64,
    end_time: i64,
    link: String,
    mod_time: i64,
    resolved: bool,
}

impl OutageRecord {
    /// Builds a record, sanitizing the title and checking the time invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataIntegrity`] when `start_time` is not positive
    /// or when a defined `end_time` lies before `start_time`.
    pub fn new(
        title: &str,
        start_time: i64,
        end_time: i64,
        link: impl Into<String>,
        mod_time: i64,
        resolved: bool,
    ) -> CoreResult<Self> {
        let record = Self {
            title: sanitize_title(title),
            start_time,
            end_time,
            link: link.into(),
            mod_time,
            resolved,
        };
        record.check_integrity()?;
        Ok(record)
    }

    /// Re-checks the invariants.
    ///
    /// Records read back from a snapshot file skip [`OutageRecord::new`], so
    /// consumers call this before trusting them.
    pub fn check_integrity(&self) -> CoreResult<()> {
        if self.start_time <= 0 {
            return Err(CoreError::integrity(
                &self.title,
                format!("start time {} is not a valid timestamp", self.start_time),
            ));
        }
        if self.has_end_time() && self.end_time < self.start_time {
            return Err(CoreError::integrity(
                &self.title,
                format!(
                    "ends ({}) before it starts ({})",
                    self.end_time, self.start_time
                ),
            ));
        }
        if sanitize_title(&self.title) != self.title {
            return Err(CoreError::integrity(
                &self.title,
                "title contains unsanitized characters",
            ));
        }
        Ok(())
    }

    /// The sanitized event name.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Start of the outage as a unix timestamp.
    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    /// End of the outage as a unix timestamp, or [`NO_TIME`].
    pub fn end_time(&self) -> i64 {
        self.end_time
    }

    /// Returns true if the outage has a defined end.
    pub fn has_end_time(&self) -> bool {
        self.end_time != NO_TIME
    }

    /// URL of the calendar entry.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// Last modification time, or [`NO_TIME`] when the feed lacks it.
    pub fn mod_time(&self) -> i64 {
        self.mod_time
    }

    /// Whether an editor flagged the outage as resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}
