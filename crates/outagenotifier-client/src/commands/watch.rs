//! `watch`: the long-running pop-up notifier.
//!
//! One scheduler task runs a poll cycle, announces transitions and sleeps
//! for `widget.update_interval_secs`. Ctrl-C stops it after the current
//! cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use outagenotifier_server::{NotifyEngine, PollCycle, Scheduler};

use crate::commands::outages::build_cycle;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs until interrupted.
pub async fn run(config: &ClientConfig) -> ClientResult<()> {
    let cycle = Arc::new(build_cycle(config)?);
    let engine = Arc::new(Mutex::new(NotifyEngine::new(config.notify_config())));

    let scheduler = Scheduler::new(config.scheduler_config());
    let handle = scheduler.handle();

    info!(
        url = %config.feed.url,
        working_directory = %config.working_directory().display(),
        "Watching outage feed"
    );

    let scheduler_task = tokio::spawn(scheduler.run(move || {
        let cycle = cycle.clone();
        let engine = engine.clone();
        async move { watch_cycle(&cycle, &engine).await }
    }));

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    if let Err(e) = handle.stop().await {
        warn!(error = %e, "Failed to send stop command to scheduler");
    }

    // Give the current cycle a moment to finish
    let _ = tokio::time::timeout(Duration::from_secs(5), scheduler_task).await;

    info!("Watcher stopped");
    Ok(())
}

/// One tick: run the cycle, then let the engine decide what to announce.
///
/// Fetch errors are only logged. Any other failure shows the error state.
async fn watch_cycle(cycle: &PollCycle, engine: &Mutex<NotifyEngine>) -> Result<(), String> {
    match cycle.run(Utc::now().timestamp()).await {
        Ok(outcome) => {
            let shown = engine.lock().await.announce(&outcome.buckets);
            debug!(
                feed_changed = outcome.feed_changed,
                outages = outcome.buckets.len(),
                shown,
                "Watch cycle finished"
            );
            Ok(())
        }
        Err(e) if e.is_fetch_error() => Err(e.to_string()),
        Err(e) => {
            error!(error = %e, "Outage cycle failed");
            engine.lock().await.announce_error(&e.to_string());
            Err(e.to_string())
        }
    }
}
