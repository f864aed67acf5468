//! Expiry sweeper - periodic background reclamation of expired entries
//!
//! One tokio task per registry. Each tick reads the expired rows and deletes
//! them one transaction at a time. A failed delete is logged and skipped.
//! A `watch` channel carries the stop signal; the task exits as soon as it
//! fires, abandoning a scan in progress.

use std::time::Duration;

use chrono::Utc;
use sqlx::AnyPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::entry::Entry;
use crate::error::Result;
use crate::registry::delete_expired;

const EXPIRED_SQL: &str =
    "SELECT id, original_url, created_at, expires_at FROM urls WHERE expires_at <= $1";

/// Handle to a running sweeper task
pub(crate) struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweeper on the current tokio runtime.
    pub(crate) fn spawn(pool: AnyPool, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(pool, interval, shutdown_rx));
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Fire the stop signal without waiting.
    pub(crate) fn cancel(&self) {
        // Err only means the task is already gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Fire the stop signal and wait for the task to exit.
    pub(crate) async fn stop(self) {
        self.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Expiry sweeper task failed");
        }
    }
}

async fn run(pool: AnyPool, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    tracing::info!(interval_secs = interval.as_secs(), "Expiry sweeper started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first sweep waits one interval
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::info!("Running scheduled sweep of expired entries...");
                tokio::select! {
                    result = sweep(&pool) => match result {
                        Ok(deleted) => {
                            tracing::info!(deleted, "Scheduled sweep of expired entries completed");
                        }
                        Err(e) => tracing::error!(error = %e, "Scheduled sweep failed"),
                    },
                    _ = shutdown_rx.changed() => break,
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }

    tracing::info!("Expiry sweeper stopped");
}

/// One scan-and-delete pass. Returns the number of rows this pass deleted.
///
/// Rows deleted concurrently by a `find` count as neither deleted nor failed.
/// A closed pool aborts the pass; any other per-row failure, pool timeouts
/// included, is logged and the pass moves on.
pub(crate) async fn sweep(pool: &AnyPool) -> Result<u64> {
    let now = Utc::now().timestamp();
    let rows = sqlx::query(EXPIRED_SQL).bind(now).fetch_all(pool).await?;

    let mut deleted = 0;
    for row in &rows {
        let entry = match Entry::from_row(row) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable row during sweep");
                continue;
            }
        };

        tracing::debug!(id = %entry.id, url = %entry.url, "Deleting expired entry");
        match delete_expired(pool, &entry.id, now).await {
            Ok(true) => deleted += 1,
            Ok(false) => {}
            Err(e) if e.is_closed() => return Err(e),
            Err(e) => {
                tracing::warn!(id = %entry.id, error = %e, "Failed to delete expired entry");
            }
        }
    }

    Ok(deleted)
}
