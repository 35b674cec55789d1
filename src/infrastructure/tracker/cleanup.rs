//! Session Cleanup Scheduler
//!
//! Background task that periodically evicts sessions which stopped reporting,
//! together with their correlation ids.
//!
//! A pass works in two steps: the candidate ids are snapshotted first, then
//! each record is re-read and removed under one store lock. A session
//! updated between the two steps is therefore kept.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::{IdAllocator, SessionStore};
use crate::infrastructure::metrics;

/// Outcome of a single cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of session ids considered.
    pub examined: usize,
    /// Ids removed from both stores.
    pub evicted: Vec<String>,
}

/// Periodic eviction of inactive sessions.
#[derive(Debug)]
pub struct CleanupScheduler {
    sessions: Arc<SessionStore>,
    ids: Arc<IdAllocator>,
    period: Duration,
    timeout: chrono::Duration,
}

impl CleanupScheduler {
    pub fn new(
        sessions: Arc<SessionStore>,
        ids: Arc<IdAllocator>,
        period: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            ids,
            period,
            timeout: chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Run one eviction pass as of `now`.
    ///
    /// A session is evicted when its record is ill-formed or when it was
    /// last seen strictly more than the timeout before `now`. Ids that
    /// vanished since the snapshot are ignored.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let candidates = self.sessions.list_ids();
        let evicted = self.sessions.remove_expired(&candidates, now, self.timeout);

        if !evicted.is_empty() {
            self.ids.remove_many(&evicted);
        }

        SweepReport {
            examined: candidates.len(),
            evicted,
        }
    }

    /// Start the periodic task. The first pass runs one period after start.
    pub fn spawn(self) -> CleanupHandle {
        let scheduler = Arc::new(self);
        let sweeper = Arc::clone(&scheduler);
        scheduler.spawn_with(move |now| sweeper.sweep(now))
    }

    fn spawn_with<F>(self: Arc<Self>, pass: F) -> CleanupHandle
    where
        F: Fn(DateTime<Utc>) -> SweepReport + Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(Arc::new(pass), shutdown_rx));
        CleanupHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run<F>(self: Arc<Self>, pass: Arc<F>, mut shutdown: watch::Receiver<bool>)
    where
        F: Fn(DateTime<Utc>) -> SweepReport + Send + Sync + 'static,
    {
        tracing::info!(
            period_secs = self.period.as_secs(),
            timeout_secs = self.timeout.num_seconds(),
            "Session cleanup started"
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let pass = Arc::clone(&pass);
                    let outcome = tokio::task::spawn_blocking(move || pass(Utc::now())).await;

                    match outcome {
                        Ok(report) => {
                            metrics::record_cleanup_pass(report.evicted.len(), self.sessions.len());
                            if report.evicted.is_empty() {
                                tracing::trace!(examined = report.examined, "No inactive sessions");
                            } else {
                                tracing::info!(
                                    examined = report.examined,
                                    evicted = ?report.evicted,
                                    remaining = self.sessions.len(),
                                    "Cleaned up inactive sessions"
                                );
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Session cleanup pass failed");
                        }
                    }
                }

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Session cleanup stopped");
    }
}

/// Handle to the running cleanup task.
///
/// Dropping the handle also stops the task at its next wake-up.
#[derive(Debug)]
pub struct CleanupHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CleanupHandle {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Session cleanup task ended abnormally");
        }
    }
}
