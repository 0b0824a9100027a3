//! The accepted outage snapshot and change detection.
//!
//! After every successful ingest the freshly normalized records are
//! serialized and compared byte for byte with the accepted `outages.json`:
//!
//! - identical: nothing is written, nothing downstream runs
//! - different (or no snapshot yet): the bytes go to a uniquely named temp
//!   file in the same directory, which is then renamed over the accepted one
//!
//! `refresh` from cron and a running `watch` may write the same directory.
//! Each writer gets its own temp file and the rename is atomic, so readers
//! (`outagenotifier show`) never see a half-written file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use outagenotifier_core::OutageRecord;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};

/// File name of the accepted snapshot inside the working directory.
pub const SNAPSHOT_FILE_NAME: &str = "outages.json";

/// Store for the accepted snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted in `working_directory`.
    pub fn new(working_directory: impl AsRef<Path>) -> Self {
        let dir = working_directory.as_ref().to_path_buf();
        Self {
            path: dir.join(SNAPSHOT_FILE_NAME),
            dir,
        }
    }

    /// Path of the accepted snapshot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offers a new record set.
    ///
    /// Returns `true` when it differs from the accepted snapshot (or none
    /// existed) and has replaced it, `false` when it was identical.
    pub fn accept(&self, records: &[OutageRecord]) -> ServerResult<bool> {
        let encoded = serde_json::to_vec_pretty(records)?;

        let previous = match fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        if previous.as_deref() == Some(encoded.as_slice()) {
            debug!(path = %self.path.display(), "Feed unchanged, snapshot kept");
            return Ok(false);
        }

        fs::create_dir_all(&self.dir)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(&encoded)?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        info!(
            path = %self.path.display(),
            count = records.len(),
            first_run = previous.is_none(),
            "Accepted new outage snapshot"
        );
        Ok(true)
    }

    /// Reads the accepted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::MissingSnapshot`] if nothing was accepted yet.
    pub fn load(&self) -> ServerResult<Vec<OutageRecord>> {
        let bytes = fs::read(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ServerError::missing_snapshot(&self.path)
            } else {
                e.into()
            }
        })?;
        let records: Vec<OutageRecord> = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), count = records.len(), "Loaded outage snapshot");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outagenotifier_core::NO_TIME;

    fn records(titles: &[&str]) -> Vec<OutageRecord> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                OutageRecord::new(
                    title,
                    1_700_000_000 + i as i64 * 60,
                    NO_TIME,
                    format!("http://calendar/event/{i}"),
                    NO_TIME,
                    false,
                )
                .unwrap()
            })
            .collect()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn first_run_is_a_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        assert!(store.accept(&records(&["Storage"])).unwrap());
        assert!(store.path().exists());
        assert_eq!(file_names(dir.path()), vec!["outages.json"]);
    }

    #[test]
    fn unchanged_feed_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let batch = records(&["Storage", "Network"]);

        assert!(store.accept(&batch).unwrap());
        let before = fs::read(store.path()).unwrap();
        let modified = fs::metadata(store.path()).unwrap().modified().unwrap();

        assert!(!store.accept(&batch).unwrap());
        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert_eq!(fs::metadata(store.path()).unwrap().modified().unwrap(), modified);
        assert_eq!(file_names(dir.path()), vec!["outages.json"]);
    }

    #[test]
    fn changed_feed_replaces_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        store.accept(&records(&["Storage"])).unwrap();
        assert!(store.accept(&records(&["Storage", "Network"])).unwrap());
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn order_is_part_of_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let mut batch = records(&["A", "B"]);
        store.accept(&batch).unwrap();
        batch.reverse();
        assert!(store.accept(&batch).unwrap());
        assert_eq!(store.load().unwrap()[0].title(), "B");
    }

    #[test]
    fn load_round_trips_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let record =
            OutageRecord::new("Login nodes", 1_700_000_000, 1_700_003_600, "http://x", 1_699_999_000, true)
                .unwrap();

        store.accept(std::slice::from_ref(&record)).unwrap();
        assert_eq!(store.load().unwrap(), vec![record]);
    }

    #[test]
    fn load_without_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(matches!(
            store.load(),
            Err(ServerError::MissingSnapshot { .. })
        ));
    }

    #[test]
    fn creates_missing_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/state"));
        assert!(store.accept(&[]).unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn stale_temp_file_does_not_leak_into_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("outages.json.tmp"), b"[{\"title\": \"half").unwrap();

        let cron = SnapshotStore::new(dir.path());
        let watcher = SnapshotStore::new(dir.path());
        assert!(cron.accept(&records(&["Storage"])).unwrap());
        assert!(watcher.accept(&records(&["Storage", "Network"])).unwrap());

        let loaded = cron.load().unwrap();
        assert_eq!(loaded, records(&["Storage", "Network"]));
        assert_eq!(
            fs::read(dir.path().join("outages.json.tmp")).unwrap(),
            b"[{\"title\": \"half"
        );
    }

    #[test]
    fn concurrent_writers_leave_valid_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let sets = [records(&["Storage"]), records(&["Storage", "Network", "Login"])];

        std::thread::scope(|scope| {
            let sets = &sets;
            for set in sets {
                let store = SnapshotStore::new(dir.path());
                scope.spawn(move || {
                    for _ in 0..50 {
                        store.accept(set).unwrap();
                    }
                });
            }
            let reader = SnapshotStore::new(dir.path());
            scope.spawn(move || {
                for _ in 0..50 {
                    match reader.load() {
                        Ok(loaded) => assert!(sets.contains(&loaded)),
                        Err(ServerError::MissingSnapshot { .. }) => {}
                        Err(e) => panic!("reader saw a broken snapshot: {e}"),
                    }
                }
            });
        });

        assert!(sets.contains(&SnapshotStore::new(dir.path()).load().unwrap()));
        assert_eq!(file_names(dir.path()), vec!["outages.json"]);
    }
}
