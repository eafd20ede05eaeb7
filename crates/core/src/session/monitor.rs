//! Periodic idle check.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::manager::SessionManager;

/// Background task that stops the transcoder once nobody is watching.
pub struct IdleMonitor {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl IdleMonitor {
    /// Spawn the idle check loop, running every `interval`.
    pub fn spawn(manager: Arc<SessionManager>, interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut shutdown_rx = shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            info!("Idle monitor started (every {:?})", interval);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Idle monitor received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if manager.check_idle().await {
                            debug!("Idle transcoder stopped");
                        }
                    }
                }
            }
            info!("Idle monitor stopped");
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal the loop to exit and wait for it.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            warn!("Idle monitor task failed: {}", e);
        }
    }
}

impl SessionManager {
    /// Spawn an [`IdleMonitor`] at the configured check interval.
    pub fn spawn_idle_monitor(self: &Arc<Self>) -> IdleMonitor {
        IdleMonitor::spawn(Arc::clone(self), self.idle_check_interval())
    }
}
