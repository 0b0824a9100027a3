//! Fixed-interval scheduler for poll cycles.
//!
//! One controlling task runs a cycle, sleeps for the configured interval and
//! repeats. The interval is measured from the end of a cycle, so a slow
//! fetch delays the next tick but cycles never overlap. Failures do not
//! change the cadence: the next tick retries.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default interval between poll cycles.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(300);

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub update_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL)
    }
}

impl SchedulerConfig {
    pub fn new(update_interval: Duration) -> Self {
        Self { update_interval }
    }
}

/// Drives poll cycles at a fixed interval.
pub struct Scheduler {
    config: SchedulerConfig,
    stop_tx: mpsc::Sender<()>,
    stop_rx: mpsc::Receiver<()>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel(1);
        Self {
            config,
            stop_tx,
            stop_rx,
        }
    }

    /// Returns a handle for stopping the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            stop_tx: self.stop_tx.clone(),
        }
    }

    /// Runs the loop until stopped or until every handle is dropped.
    ///
    /// `cycle_fn` is called once immediately, then once per tick. It returns
    /// an error message on failure; the loop keeps going either way.
    pub async fn run<F, Fut>(self, cycle_fn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), String>> + Send,
    {
        let Scheduler {
            config,
            stop_tx,
            mut stop_rx,
        } = self;
        // Stop requests only arrive through handles.
        drop(stop_tx);

        info!(
            interval_secs = config.update_interval.as_secs(),
            "Scheduler started"
        );

        let mut failures = 0u32;
        run_cycle(&cycle_fn, &mut failures).await;

        loop {
            debug!(
                delay_secs = config.update_interval.as_secs(),
                "Scheduling next cycle"
            );

            tokio::select! {
                _ = tokio::time::sleep(config.update_interval) => {
                    run_cycle(&cycle_fn, &mut failures).await;
                }
                _ = stop_rx.recv() => {
                    info!("Scheduler stopping");
                    break;
                }
            }
        }
    }
}

async fn run_cycle<F, Fut>(cycle_fn: &F, failures: &mut u32)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<(), String>>,
{
    debug!("Starting poll cycle");
    match cycle_fn().await {
        Ok(()) => {
            debug!("Poll cycle completed");
            *failures = 0;
        }
        Err(e) => {
            *failures += 1;
            warn!(
                error = %e,
                failures = *failures,
                "Poll cycle failed, retrying on next tick"
            );
        }
    }
}

/// Handle for stopping a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    stop_tx: mpsc::Sender<()>,
}

impl SchedulerHandle {
    /// Stops the scheduler after the current cycle.
    pub async fn stop(&self) -> Result<(), mpsc::error::SendError<()>> {
        self.stop_tx.send(()).await
    }
}
