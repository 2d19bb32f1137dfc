//! Background scheduler that drives the monitor's evaluation cycles.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, oneshot};

use super::monitor::{CheckOutcome, NetworkMonitor};
use crate::logging::{kv, Logger};

/// Run evaluation cycles until a shutdown signal arrives.
///
/// A cycle runs right away, then the loop waits `poll_interval` or the
/// shutdown signal, whichever comes first. Cycle errors are logged and the
/// loop keeps going.
pub async fn run(
    monitor: Arc<NetworkMonitor>,
    poll_interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
    log: Logger,
) {
    log.info(
        format_args!("network monitor started"),
        &[
            kv("network", &monitor.network()),
            kv("poll_interval_ms", &poll_interval.as_millis()),
        ],
    );

    loop {
        match monitor.check_nodes(Utc::now()).await {
            Ok(CheckOutcome::Evaluated { alert, error_streak }) => log.debug(
                format_args!("nodes check finished"),
                &[kv("alert", &alert), kv("error_streak", &error_streak)],
            ),
            Ok(CheckOutcome::Frozen(_)) | Ok(CheckOutcome::Discarded(_)) => {}
            Err(err) => log.error(
                format_args!("failed to check nodes status"),
                &[kv("error", &err)],
            ),
        }

        tokio::select! {
            _ = shutdown.recv() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    log.info(format_args!("network monitor stopped"), &[]);
}

/// Handle to a spawned [`run`] loop.
pub struct MonitorRuntime {
    shutdown_tx: broadcast::Sender<()>,
    done_rx: oneshot::Receiver<()>,
}

impl MonitorRuntime {
    /// Spawn the scheduler on the current tokio runtime.
    pub fn spawn(monitor: Arc<NetworkMonitor>, poll_interval: Duration, log: Logger) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
        let (done_tx, done_rx) = oneshot::channel();

        tokio::spawn(async move {
            run(monitor, poll_interval, shutdown_rx, log).await;
            let _ = done_tx.send(());
        });

        Self {
            shutdown_tx,
            done_rx,
        }
    }

    /// Signal the loop to stop and wait until it has.
    pub async fn shutdown(self) {
        // send only fails once the loop is already gone
        let _ = self.shutdown_tx.send(());
        let _ = self.done_rx.await;
    }
}
