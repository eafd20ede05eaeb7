//! Ownership of the single transcoder process.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::TranscoderError;
use super::traits::{Launcher, TranscodeProcess};
use super::types::{ChannelId, Invocation};
use crate::config::TranscoderConfig;
use crate::metrics::{TRANSCODES_STARTED, TRANSCODE_FAILURES, TRANSCODE_STOPS};
use crate::segments::SegmentStore;

/// Starts, stops and polls at most one transcoder process.
pub struct ProcessSupervisor {
    launcher: Arc<dyn Launcher>,
    config: TranscoderConfig,
    source_url_template: String,
    store: SegmentStore,
    process: Option<Box<dyn TranscodeProcess>>,
}

impl ProcessSupervisor {
    pub fn new(
        launcher: Arc<dyn Launcher>,
        config: TranscoderConfig,
        source_url_template: impl Into<String>,
    ) -> Self {
        let store = SegmentStore::new(config.segment_dir.clone());
        Self {
            launcher,
            config,
            source_url_template: source_url_template.into(),
            store,
            process: None,
        }
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn invocation(&self, channel: &ChannelId) -> Invocation {
        Invocation::build(&self.config, &self.source_url_template, channel)
    }

    /// Stops any running process, then spawns one for `channel`.
    pub async fn start(&mut self, channel: &ChannelId) -> Result<(), TranscoderError> {
        if self.stop().await {
            TRANSCODE_STOPS.with_label_values(&["switch"]).inc();
        }

        info!("Start transcoding channel {}", channel);

        let invocation = self.invocation(channel);
        debug!("{}", invocation.command_line());

        match self.launcher.launch(&invocation) {
            Ok(process) => {
                info!(
                    "Transcoder for channel {} running (pid {:?})",
                    channel,
                    process.pid()
                );
                self.process = Some(process);
                TRANSCODES_STARTED.inc();
                Ok(())
            }
            Err(e) => {
                error!("Error starting transcoder process: {}", e);
                TRANSCODE_FAILURES.with_label_values(&["spawn"]).inc();
                Err(e)
            }
        }
    }

    /// Kills the running process, waits the grace period and purges the
    /// segment directory. Returns `false` without doing anything when no
    /// process is running.
    ///
    /// Kill and cleanup failures are logged only; once this returns the
    /// supervisor is always empty.
    pub async fn stop(&mut self) -> bool {
        let Some(mut process) = self.process.take() else {
            return false;
        };

        info!("Stop transcoding");
        debug!("Trying to kill the transcoder process {:?}", process.pid());
        if let Err(e) = process.kill() {
            error!("Error when killing transcoder: {}", e);
        }

        // The tuner needs time to release the channel after its consumer goes away.
        tokio::time::sleep(self.grace_period()).await;
        drop(process);
        info!("Transcoding stopped");

        let report = self.store.delete_all().await;
        debug!(
            "Cleanup removed {} files ({} failed)",
            report.deleted, report.failed
        );
        true
    }

    /// Drops a process that exited on its own and purges its partial output.
    pub async fn reap(&mut self) {
        if let Some(process) = self.process.take() {
            warn!("Transcoder {:?} exited unexpectedly", process.pid());
            drop(process);
            self.store.delete_all().await;
        }
    }

    /// Whether a process is running. Polls the process; never blocks.
    pub fn is_alive(&mut self) -> bool {
        self.process.as_mut().is_some_and(|p| p.is_alive())
    }

    /// Whether a process handle is held, alive or not.
    pub fn has_process(&self) -> bool {
        self.process.is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(|p| p.pid())
    }

    fn grace_period(&self) -> Duration {
        Duration::from_millis(self.config.stop_grace_ms)
    }
}
