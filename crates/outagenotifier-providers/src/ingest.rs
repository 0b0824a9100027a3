//! The ingest step of a poll cycle: fetch, cache raw, normalize.
//!
//! ```text
//! FeedSource ──fetch──▶ <working dir>/OutagesCache.{ics,xml} ──read──▶ parse_ics / parse_rss
//!                        (unique temp file + rename)                      │
//!                                                                         ▼
//!                                                                Vec<OutageRecord>
//! ```
//!
//! A failed fetch returns before anything touches the disk, so the previous
//! raw cache stays authoritative.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use outagenotifier_core::{DateRangeParser, OutageRecord};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::feed::FeedFormat;
use crate::ics::parse_ics;
use crate::resolved::ResolvedMarker;
use crate::rss::parse_rss;
use crate::source::FeedSource;

/// Normalizes feed content of the given format.
pub fn normalize(
    format: FeedFormat,
    content: &str,
    marker: &ResolvedMarker,
) -> ProviderResult<Vec<OutageRecord>> {
    let result = match format {
        FeedFormat::Ical => parse_ics(content, marker),
        FeedFormat::Rss => parse_rss(content, marker, &DateRangeParser::new()),
    };
    result.map_err(|e| {
        if e.feed().is_some() {
            e
        } else {
            e.with_feed(format.as_str())
        }
    })
}

/// Fetches a feed, keeps a raw copy on disk and turns it into records.
pub struct FeedIngestor {
    source: Box<dyn FeedSource>,
    format: FeedFormat,
    cache_path: PathBuf,
    marker: ResolvedMarker,
}

impl FeedIngestor {
    /// Creates an ingestor that caches raw content in `working_directory`.
    pub fn new(
        source: Box<dyn FeedSource>,
        format: FeedFormat,
        working_directory: impl AsRef<Path>,
        marker: ResolvedMarker,
    ) -> Self {
        Self {
            source,
            format,
            cache_path: working_directory.as_ref().join(format.cache_file_name()),
            marker,
        }
    }

    pub fn format(&self) -> FeedFormat {
        self.format
    }

    /// Path of the raw feed cache.
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Runs fetch, store and normalize in order.
    ///
    /// # Errors
    ///
    /// Fetch errors leave the raw cache untouched. Storage and parse errors
    /// abort after the new content has been cached.
    pub async fn ingest(&self) -> ProviderResult<Vec<OutageRecord>> {
        self.fetch_and_store().await?;
        self.normalize_cached()
    }

    /// Downloads the feed and atomically replaces the raw cache.
    pub async fn fetch_and_store(&self) -> ProviderResult<()> {
        let body = self
            .source
            .fetch()
            .await
            .map_err(|e| e.with_feed(self.format.as_str()))?;
        self.store(&body)?;
        info!(
            source = %self.source.name(),
            path = %self.cache_path.display(),
            bytes = body.len(),
            "Cached raw feed"
        );
        Ok(())
    }

    /// Reads the raw cache back and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns a `MissingFile` error if no raw cache exists.
    pub fn normalize_cached(&self) -> ProviderResult<Vec<OutageRecord>> {
        let content = fs::read_to_string(&self.cache_path).map_err(|e| {
            let err = if e.kind() == ErrorKind::NotFound {
                ProviderError::missing_file(format!(
                    "feed cache {} not found",
                    self.cache_path.display()
                ))
            } else {
                ProviderError::io(format!("failed to read {}", self.cache_path.display()))
            };
            err.with_source(e)
        })?;

        let records = normalize(self.format, &content, &self.marker)?;
        debug!(count = records.len(), format = %self.format, "Normalized feed");
        Ok(records)
    }

    fn store(&self, body: &str) -> ProviderResult<()> {
        let dir = self.cache_path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(|e| {
            ProviderError::io(format!("failed to create {}", dir.display())).with_source(e)
        })?;

        // One temp file per writer; cron and the watcher may overlap.
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
            ProviderError::io(format!("failed to create temp file in {}", dir.display()))
                .with_source(e)
        })?;
        temp.write_all(body.as_bytes()).map_err(|e| {
            ProviderError::io(format!("failed to write {}", temp.path().display())).with_source(e)
        })?;
        temp.persist(&self.cache_path).map_err(|e| {
            ProviderError::io(format!("failed to replace {}", self.cache_path.display()))
                .with_source(e.error)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::source::{BoxFuture, ErrorSource};
    use tempfile::tempdir;

    struct StaticSource(String);

    impl FeedSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        fn fetch(&self) -> BoxFuture<'_, ProviderResult<String>> {
            let body = self.0.clone();
            Box::pin(async move { Ok(body) })
        }
    }

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        PRODID:-//Test//Outages//EN\r\n\
        BEGIN:VEVENT\r\n\
        UID:1@outages\r\n\
        DTSTART:20150624T123500Z\r\n\
        DTEND:20150624T143500Z\r\n\
        SUMMARY:Cluster\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    fn ingestor(source: impl FeedSource + 'static, dir: &Path) -> FeedIngestor {
        FeedIngestor::new(
            Box::new(source),
            FeedFormat::Ical,
            dir,
            ResolvedMarker::default(),
        )
    }

    #[tokio::test]
    async fn ingest_caches_and_normalizes() {
        let dir = tempdir().unwrap();
        let ingestor = ingestor(StaticSource(ICS.to_string()), dir.path());

        let records = ingestor.ingest().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Cluster");

        let cached = fs::read_to_string(dir.path().join("OutagesCache.ics")).unwrap();
        assert_eq!(cached, ICS);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn overlapping_writers_ignore_stale_temp_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("OutagesCache.ics.tmp"), "BEGIN:VCAL").unwrap();

        let renamed = ICS.replace("SUMMARY:Cluster", "SUMMARY:Storage");
        let cron = ingestor(StaticSource(ICS.to_string()), dir.path());
        let watcher = ingestor(StaticSource(renamed.clone()), dir.path());
        cron.fetch_and_store().await.unwrap();
        watcher.fetch_and_store().await.unwrap();

        let cached = fs::read_to_string(dir.path().join("OutagesCache.ics")).unwrap();
        assert_eq!(cached, renamed);
        assert_eq!(cron.normalize_cached().unwrap()[0].title(), "Storage");
        assert_eq!(
            fs::read_to_string(dir.path().join("OutagesCache.ics.tmp")).unwrap(),
            "BEGIN:VCAL"
        );
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_cache() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("OutagesCache.ics"), ICS).unwrap();

        let ingestor = ingestor(
            ErrorSource::new("offline", ProviderError::network("timed out")),
            dir.path(),
        );
        let err = ingestor.ingest().await.unwrap_err();
        assert!(err.is_fetch_error());
        assert_eq!(err.feed(), Some("ical"));

        let cached = fs::read_to_string(dir.path().join("OutagesCache.ics")).unwrap();
        assert_eq!(cached, ICS);
    }

    #[test]
    fn missing_cache_is_missing_file() {
        let dir = tempdir().unwrap();
        let ingestor = ingestor(StaticSource(String::new()), dir.path());
        let err = ingestor.normalize_cached().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::MissingFile);
    }

    #[tokio::test]
    async fn creates_missing_working_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("spool").join("outagenotifier");
        let ingestor = ingestor(StaticSource(ICS.to_string()), &nested);
        ingestor.fetch_and_store().await.unwrap();
        assert!(nested.join("OutagesCache.ics").exists());
    }

    #[tokio::test]
    async fn unparsable_content_is_tagged_with_format() {
        let dir = tempdir().unwrap();
        let ingestor = FeedIngestor::new(
            Box::new(StaticSource("<rss><channel><item></channel>".to_string())),
            FeedFormat::Rss,
            dir.path(),
            ResolvedMarker::default(),
        );
        let err = ingestor.ingest().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert_eq!(err.feed(), Some("rss"));
        assert!(dir.path().join("OutagesCache.xml").exists());
    }
}
