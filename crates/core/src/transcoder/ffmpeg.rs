//! FFmpeg process launcher.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tracing::{debug, warn};

use super::error::TranscoderError;
use super::traits::{Launcher, TranscodeProcess};
use super::types::{ChannelId, Invocation};

/// Launches the transcoder as a child process of this server.
#[derive(Debug, Default)]
pub struct FfmpegLauncher;

impl FfmpegLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launcher for FfmpegLauncher {
    fn launch(&self, invocation: &Invocation) -> Result<Box<dyn TranscodeProcess>, TranscoderError> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TranscoderError::from_spawn(&invocation.program, e))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(log_stderr(invocation.channel.clone(), stderr));
        }

        Ok(Box::new(FfmpegProcess { child }))
    }

    async fn validate(&self, program: &Path) -> Result<(), TranscoderError> {
        let status = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| TranscoderError::from_spawn(program, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(TranscoderError::ValidationFailed {
                reason: format!("{} -version exited with {}", program.display(), status),
            })
        }
    }
}

/// Forwards transcoder diagnostics to the log, one line at a time.
async fn log_stderr(channel: ChannelId, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(channel = %channel, "transcoder: {}", line);
    }
    debug!(channel = %channel, "transcoder stderr closed");
}

struct FfmpegProcess {
    child: Child,
}

impl TranscodeProcess for FfmpegProcess {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!("Transcoder exited with {}", status);
                false
            }
            Err(e) => {
                warn!("Failed to poll transcoder status: {}", e);
                false
            }
        }
    }

    fn kill(&mut self) -> Result<(), TranscoderError> {
        self.child.start_kill().map_err(TranscoderError::KillFailed)
    }
}
