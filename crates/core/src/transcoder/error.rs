//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing the transcoder process.
#[derive(Debug, Error)]
pub enum TranscoderError {
    /// Transcoder binary not found.
    #[error("Transcoder not found at path: {path}")]
    NotFound { path: PathBuf },

    /// The binary exists but could not be launched (permissions, bad format).
    #[error("Failed to spawn transcoder {path}: {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sending the kill signal failed.
    #[error("Failed to kill transcoder: {0}")]
    KillFailed(#[source] std::io::Error),

    /// The binary ran but did not behave like a transcoder.
    #[error("Transcoder validation failed: {reason}")]
    ValidationFailed { reason: String },
}

impl TranscoderError {
    /// Maps an I/O error from spawning `path` to the matching variant.
    pub fn from_spawn(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::SpawnFailed { path, source }
        }
    }

    /// Whether the process never started.
    pub fn is_spawn_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SpawnFailed { .. })
    }
}
