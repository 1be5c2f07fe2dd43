use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info};

use super::drain::WriteBehind;
use crate::config::MaintenanceConfig;
use crate::metrics::IndexerMetrics;

/// Handle of the background maintenance thread
///
/// Dropping the handle without calling `shutdown` still stops the thread
/// once the channel disconnects, but does not wait for it.
pub struct MaintenanceWorker {
    shutdown_tx: Option<Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl MaintenanceWorker {
    pub fn spawn(
        write_behind: Arc<WriteBehind>,
        metrics: IndexerMetrics,
        config: &MaintenanceConfig,
    ) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);
        let idle = config.idle_interval();
        let pause = config.drain_pause();

        let join = thread::Builder::new()
            .name("ftdex-maintenance".to_string())
            .spawn(move || run(&write_behind, &metrics, &shutdown_rx, idle, pause))?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            join: Some(join),
        })
    }

    /// Signal the thread, then wait until it has drained both queues
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                error!("maintenance thread panicked");
            }
        }
    }
}

enum Wake {
    Work,
    Shutdown,
}

fn wait(shutdown_rx: &Receiver<()>, timeout: Duration) -> Wake {
    match shutdown_rx.recv_timeout(timeout) {
        Err(RecvTimeoutError::Timeout) => Wake::Work,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => Wake::Shutdown,
    }
}

fn run(
    write_behind: &WriteBehind,
    metrics: &IndexerMetrics,
    shutdown_rx: &Receiver<()>,
    idle: Duration,
    pause: Duration,
) {
    info!("maintenance thread started");
    'cycle: loop {
        if let Wake::Shutdown = wait(shutdown_rx, idle) {
            break;
        }

        loop {
            match write_behind.do_work() {
                Ok(true) => {}
                Ok(false) => break,
                // failed item stays queued for the next cycle
                Err(_) => break,
            }
            metrics.set_status(&write_behind.status());
            if let Wake::Shutdown = wait(shutdown_rx, pause) {
                break 'cycle;
            }
        }
        metrics.set_status(&write_behind.status());
    }

    debug!("draining before shutdown: {}", write_behind.status());
    write_behind.drain_all_logged();
    metrics.set_status(&write_behind.status());
    info!("maintenance thread stopped");
}
