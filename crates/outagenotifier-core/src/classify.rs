//! Temporal classification of outage records.
//!
//! Each record lands in at most one of the [`OutageStatus`] buckets, judged
//! against a single `now`. Rules are tried in a fixed order:
//!
//! 1. **active**: started, not ended (or no end), not resolved
//! 2. **completed**: ended or resolved, and the end lies within the past scope
//! 3. **scheduled**: not started, not resolved, starts within the ahead scope
//!
//! Anything else is out of scope and dropped silently.

use tracing::{debug, info};

use crate::error::CoreResult;
use crate::record::OutageRecord;
use crate::status::OutageStatus;

/// 31 days.
pub const DEFAULT_SCOPE_AHEAD: i64 = 2_678_400;
/// 12 hours.
pub const DEFAULT_SCOPE_PAST: i64 = 43_200;

/// Classified outages, each list in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    pub completed: Vec<OutageRecord>,
    pub scheduled: Vec<OutageRecord>,
    pub active: Vec<OutageRecord>,
}

impl Buckets {
    /// Returns the records of one bucket.
    pub fn get(&self, status: OutageStatus) -> &[OutageRecord] {
        match status {
            OutageStatus::Active => &self.active,
            OutageStatus::Completed => &self.completed,
            OutageStatus::Scheduled => &self.scheduled,
        }
    }

    /// Iterates over every classified record in presentation order
    /// (completed, scheduled, active).
    pub fn iter(&self) -> impl Iterator<Item = (OutageStatus, &OutageRecord)> {
        OutageStatus::ALL
            .into_iter()
            .flat_map(move |status| self.get(status).iter().map(move |r| (status, r)))
    }

    /// Total number of classified records.
    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len() + self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, status: OutageStatus, record: OutageRecord) {
        match status {
            OutageStatus::Active => self.active.push(record),
            OutageStatus::Completed => self.completed.push(record),
            OutageStatus::Scheduled => self.scheduled.push(record),
        }
    }
}

/// Partitions records into buckets relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    scope_ahead: i64,
    scope_past: i64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_SCOPE_AHEAD, DEFAULT_SCOPE_PAST)
    }
}

impl Classifier {
    /// Creates a classifier.
    ///
    /// `scope_ahead` bounds how far in the future a scheduled outage may
    /// start, `scope_past` how long ago a completed outage may have ended,
    /// both in seconds.
    pub fn new(scope_ahead: i64, scope_past: i64) -> Self {
        Self {
            scope_ahead,
            scope_past,
        }
    }

    pub fn scope_ahead(&self) -> i64 {
        self.scope_ahead
    }

    pub fn scope_past(&self) -> i64 {
        self.scope_past
    }

    /// Classifies every record at `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DataIntegrity`](crate::CoreError::DataIntegrity)
    /// for the first record claiming an impossible temporal state. No partial
    /// result is returned.
    pub fn classify(&self, records: &[OutageRecord], now: i64) -> CoreResult<Buckets> {
        let mut buckets = Buckets::default();

        for record in records {
            if let Some(status) = self.status_of(record, now)? {
                buckets.push(status, record.clone());
            }
        }

        info!(
            active = buckets.active.len(),
            completed = buckets.completed.len(),
            scheduled = buckets.scheduled.len(),
            dropped = records.len() - buckets.len(),
            "Sorted outages"
        );
        Ok(buckets)
    }

    /// Returns the bucket for a single record, or `None` when it is out of
    /// every scope.
    pub fn status_of(&self, record: &OutageRecord, now: i64) -> CoreResult<Option<OutageStatus>> {
        // Ending before starting is rejected here, so no rule below can see it.
        record.check_integrity()?;

        let seconds_until_start = record.start_time() - now;
        let seconds_until_end = record.end_time() - now;
        let has_end_time = record.has_end_time();
        let has_started = seconds_until_start <= 0;
        let has_ended = has_end_time && seconds_until_end <= 0;
        let resolved = record.is_resolved();

        // Without an end there is nothing to measure the past scope against,
        // so a resolved outage lacking an end time is never shown completed.
        let within_past_scope = has_end_time && seconds_until_end.abs() < self.scope_past;
        let within_future_scope = seconds_until_start < self.scope_ahead;

        let status = if has_started && (!has_ended || !has_end_time) && !resolved {
            Some(OutageStatus::Active)
        } else if ((has_started && has_ended) || resolved) && within_past_scope {
            Some(OutageStatus::Completed)
        } else if !has_started && !resolved && within_future_scope {
            Some(OutageStatus::Scheduled)
        } else {
            None
        };

        debug!(
            title = %record.title(),
            seconds_until_start,
            seconds_until_end = has_end_time.then_some(seconds_until_end),
            has_started,
            has_ended,
            has_end_time,
            resolved,
            within_past_scope,
            within_future_scope,
            status = status.map_or("none", |s| s.as_str()),
            "Sorted outage"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::record::NO_TIME;

    const NOW: i64 = 1_700_000_000;

    fn record(title: &str, start: i64, end: i64, resolved: bool) -> OutageRecord {
        OutageRecord::new(title, start, end, "http://calendar/event", NO_TIME, resolved).unwrap()
    }

    fn bucket_of(classifier: &Classifier, record: &OutageRecord) -> Option<OutageStatus> {
        classifier.status_of(record, NOW).unwrap()
    }

    mod scenarios {
        use super::*;

        #[test]
        fn started_without_end_is_active() {
            let r = record("A", NOW - 3600, NO_TIME, false);
            assert_eq!(bucket_of(&Classifier::default(), &r), Some(OutageStatus::Active));
        }

        #[test]
        fn resolved_recently_ended_is_completed() {
            let r = record("B", NOW - 7200, NOW - 60, true);
            let classifier = Classifier::new(DEFAULT_SCOPE_AHEAD, 3600);
            assert_eq!(bucket_of(&classifier, &r), Some(OutageStatus::Completed));
        }

        #[test]
        fn future_within_scope_is_scheduled() {
            let r = record("C", NOW + 1000, NO_TIME, false);
            let classifier = Classifier::new(2_678_400, DEFAULT_SCOPE_PAST);
            assert_eq!(bucket_of(&classifier, &r), Some(OutageStatus::Scheduled));
        }

        #[test]
        fn end_before_start_is_integrity_error() {
            // Bypasses OutageRecord::new, as a tampered snapshot would.
            let r: OutageRecord = serde_json::from_value(serde_json::json!({
                "title": "D",
                "start_time": NOW - 100,
                "end_time": NOW - 200,
                "link": "",
                "mod_time": 0,
                "resolved": false
            }))
            .unwrap();
            let err = Classifier::default().status_of(&r, NOW).unwrap_err();
            assert!(err.is_integrity());
            assert!(Classifier::default().classify(&[r], NOW).is_err());
        }

        #[test]
        fn ended_before_future_start_is_rejected_by_record_check() {
            let r: OutageRecord = serde_json::from_value(serde_json::json!({
                "title": "E",
                "start_time": NOW + 500,
                "end_time": NOW - 500,
                "link": "",
                "mod_time": 0,
                "resolved": false
            }))
            .unwrap();
            match Classifier::default().status_of(&r, NOW).unwrap_err() {
                CoreError::DataIntegrity { title, reason } => {
                    assert_eq!(title, "E");
                    assert!(reason.starts_with("ends ("));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    mod rules {
        use super::*;

        #[test]
        fn started_with_future_end_is_active() {
            let r = record("Rolling", NOW - 10, NOW + 10, false);
            assert_eq!(bucket_of(&Classifier::default(), &r), Some(OutageStatus::Active));
        }

        #[test]
        fn start_equal_to_now_has_started() {
            let r = record("Edge", NOW, NO_TIME, false);
            assert_eq!(bucket_of(&Classifier::default(), &r), Some(OutageStatus::Active));
        }

        #[test]
        fn ended_without_resolution_is_completed() {
            let r = record("Done", NOW - 600, NOW - 300, false);
            assert_eq!(bucket_of(&Classifier::default(), &r), Some(OutageStatus::Completed));
        }

        #[test]
        fn ended_outside_past_scope_is_dropped() {
            let r = record("Old", NOW - 100_000, NOW - 50_000, false);
            assert_eq!(bucket_of(&Classifier::default(), &r), None);
        }

        #[test]
        fn resolved_in_progress_is_completed() {
            let r = record("Fixed early", NOW - 600, NOW + 600, true);
            assert_eq!(bucket_of(&Classifier::default(), &r), Some(OutageStatus::Completed));
        }

        #[test]
        fn resolved_without_end_is_never_completed() {
            let r = record("Fixed", NOW - 600, NO_TIME, true);
            assert_eq!(bucket_of(&Classifier::default(), &r), None);
        }

        #[test]
        fn future_beyond_scope_is_dropped() {
            let r = record("Far", NOW + DEFAULT_SCOPE_AHEAD, NO_TIME, false);
            assert_eq!(bucket_of(&Classifier::default(), &r), None);
        }

        #[test]
        fn resolved_future_is_not_scheduled() {
            let r = record("Cancelled", NOW + 600, NO_TIME, true);
            assert_eq!(bucket_of(&Classifier::default(), &r), None);
        }

        #[test]
        fn no_end_is_never_completed_unless_resolved() {
            let classifier = Classifier::new(i64::MAX, i64::MAX);
            for offset in [-100_000, -1, 0, 1, 100_000] {
                let r = record("Open", NOW + offset, NO_TIME, false);
                assert_ne!(bucket_of(&classifier, &r), Some(OutageStatus::Completed));
            }
        }
    }

    #[test]
    fn buckets_are_disjoint_and_ordered() {
        let records = vec![
            record("first active", NOW - 50, NO_TIME, false),
            record("scheduled", NOW + 50, NO_TIME, false),
            record("completed", NOW - 500, NOW - 100, false),
            record("dropped", NOW + DEFAULT_SCOPE_AHEAD * 2, NO_TIME, false),
            record("second active", NOW - 10, NOW + 10, false),
        ];
        let buckets = Classifier::default().classify(&records, NOW).unwrap();

        let titles = |list: &[OutageRecord]| list.iter().map(|r| r.title().to_string()).collect::<Vec<_>>();
        assert_eq!(titles(&buckets.active), vec!["first active", "second active"]);
        assert_eq!(titles(&buckets.scheduled), vec!["scheduled"]);
        assert_eq!(titles(&buckets.completed), vec!["completed"]);
        assert_eq!(buckets.len(), 4);

        let order: Vec<_> = buckets.iter().map(|(status, _)| status).collect();
        assert_eq!(
            order,
            vec![
                OutageStatus::Completed,
                OutageStatus::Scheduled,
                OutageStatus::Active,
                OutageStatus::Active
            ]
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let records: Vec<_> = (0..20)
            .map(|i| record(&format!("r{i}"), NOW - 5_000 + i * 500, if i % 3 == 0 { NO_TIME } else { NOW - 4_000 + i * 600 }, i % 4 == 0))
            .collect();
        let classifier = Classifier::new(3_000, 2_000);
        let first = classifier.classify(&records, NOW).unwrap();
        let second = classifier.classify(&records, NOW).unwrap();
        assert_eq!(first, second);
        assert!(first.len() <= records.len());
    }

    #[test]
    fn empty_input_gives_empty_buckets() {
        let buckets = Classifier::default().classify(&[], NOW).unwrap();
        assert!(buckets.is_empty());
    }
}
