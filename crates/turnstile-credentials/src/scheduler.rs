//! Periodic credential cleanup.
//!
//! Each cycle sweeps expired credentials (rotating their identities) and then
//! purges inactive rows. Sweep runs first so credentials it deactivates are
//! removed in the same cycle. Both steps take the per-identity row locks and
//! are safe to run alongside live validation traffic.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{CredentialLifecycle, Result, DEFAULT_CREDENTIAL_VALIDITY};

/// Default interval between cleanup cycles.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Outcome of one cleanup cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Identities whose expired credential was rotated.
    pub rotated: usize,
    /// Inactive credentials deleted.
    pub purged: usize,
}

/// Credential cleanup task.
pub struct CleanupScheduler<C: CredentialLifecycle> {
    lifecycle: Arc<C>,
    interval: Duration,
    /// Validity of credentials issued by the sweep.
    validity: Option<Duration>,
}

impl<C: CredentialLifecycle + 'static> CleanupScheduler<C> {
    /// Create a scheduler with the default interval and validity.
    pub fn new(lifecycle: Arc<C>) -> Self {
        Self {
            lifecycle,
            interval: CLEANUP_INTERVAL,
            validity: Some(DEFAULT_CREDENTIAL_VALIDITY),
        }
    }

    /// Override the cycle interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the validity of credentials issued by the sweep.
    pub fn with_validity(mut self, validity: Option<Duration>) -> Self {
        self.validity = validity;
        self
    }

    /// Run a single cycle: sweep, then purge.
    ///
    /// The purge runs even when the sweep fails; the sweep error is returned
    /// after it.
    pub async fn run_cycle(&self) -> Result<CleanupReport> {
        debug!("Starting credential cleanup cycle");

        let swept = self.lifecycle.sweep_expired(self.validity).await;
        if let Err(e) = &swept {
            warn!(error = %e, "Expired credential sweep failed, purging anyway");
        }
        let purged = self.lifecycle.purge_inactive().await?;
        let rotated = swept?;

        Ok(CleanupReport {
            rotated: rotated.len(),
            purged,
        })
    }

    /// Start the background task.
    ///
    /// The first cycle runs immediately. A cycle in progress always completes
    /// before the task observes a stop request.
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = self.interval.as_secs(), "Credential cleanup scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match self.run_cycle().await {
                            Ok(report) if report != CleanupReport::default() => {
                                info!(rotated = report.rotated, purged = report.purged, "Credential cleanup cycle complete");
                            }
                            Ok(_) => debug!("Credential cleanup cycle found nothing to do"),
                            Err(e) => warn!(error = %e, retryable = e.kind().is_retryable(), "Credential cleanup cycle failed"),
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Credential cleanup scheduler stopped");
        });

        SchedulerHandle { stop_tx, task }
    }
}

/// Owner handle for a running [`CleanupScheduler`].
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Whether the background task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(self) {
        if self.stop_tx.send(true).is_err() {
            debug!("Cleanup scheduler already exited");
        }

        if let Err(e) = self.task.await {
            warn!(error = %e, "Cleanup scheduler task ended abnormally");
        }
    }
}
