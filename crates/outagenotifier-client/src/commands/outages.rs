//! `refresh` and `show`: the cron side and the login-shell side.

use chrono::Utc;
use tracing::{info, warn};

use outagenotifier_core::ConsoleFormatter;
use outagenotifier_providers::{FeedClient, FeedIngestor};
use outagenotifier_server::{PollCycle, SnapshotStore};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Builds a poll cycle over the configured feed.
pub fn build_cycle(config: &ClientConfig) -> ClientResult<PollCycle> {
    config.validate()?;

    let client = FeedClient::new(config.feed_client_config()?)?;
    let working_directory = config.working_directory();
    let ingestor = FeedIngestor::new(
        Box::new(client),
        config.feed.format,
        &working_directory,
        config.resolved_marker()?,
    );

    Ok(PollCycle::new(
        ingestor,
        SnapshotStore::new(&working_directory),
        config.classifier(),
    ))
}

/// Fetches the feed and updates the snapshot. Prints nothing.
///
/// An unreachable feed is logged and tolerated: the previous snapshot stays
/// in place and the next run retries.
pub async fn refresh(config: &ClientConfig) -> ClientResult<()> {
    let cycle = build_cycle(config)?;
    match cycle.refresh().await {
        Ok(changed) => {
            info!(changed, path = %cycle.store().path().display(), "Refresh finished");
            Ok(())
        }
        Err(e) if e.is_fetch_error() => {
            warn!(error = %e, "Feed unreachable, keeping previous snapshot");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Renders the accepted snapshot classified at `now`.
pub fn render_snapshot(config: &ClientConfig, now: i64, color: bool) -> ClientResult<String> {
    let store = SnapshotStore::new(config.working_directory());
    let records = store.load()?;
    let buckets = config.classifier().classify(&records, now)?;
    Ok(ConsoleFormatter::new(color).render(&buckets))
}

/// Prints the current outages. Prints nothing when none are in scope.
pub fn show(config: &ClientConfig, color: bool) -> ClientResult<()> {
    let output = render_snapshot(config, Utc::now().timestamp(), color)?;
    print!("{output}");
    Ok(())
}
