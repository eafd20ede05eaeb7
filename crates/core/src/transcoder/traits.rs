//! Trait definitions for the transcoder module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TranscoderError;
use super::types::Invocation;

/// A running transcoder process.
///
/// Exit is detected by polling [`TranscodeProcess::is_alive`]; there is no
/// exit notification.
pub trait TranscodeProcess: Send {
    /// Operating system process id, if known.
    fn pid(&self) -> Option<u32>;

    /// Whether the process is still running. Never blocks.
    fn is_alive(&mut self) -> bool;

    /// Requests termination. Returns immediately, without waiting for exit.
    fn kill(&mut self) -> Result<(), TranscoderError>;
}

/// Spawns transcoder processes.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Spawns the process described by `invocation`.
    fn launch(&self, invocation: &Invocation) -> Result<Box<dyn TranscodeProcess>, TranscoderError>;

    /// Checks that `program` can be executed.
    async fn validate(&self, program: &Path) -> Result<(), TranscoderError>;
}
