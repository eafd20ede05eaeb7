//! Error types for the session manager.

use thiserror::Error;

use crate::transcoder::{ChannelId, TranscoderError};

/// Errors returned to a channel request.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The transcoder could not be launched.
    #[error("failed to start transcoder: {0}")]
    Spawn(#[from] TranscoderError),

    /// The transcoder went away before the playlist appeared.
    #[error("transcoder for channel {channel} exited before its playlist appeared")]
    TranscodeFailed { channel: ChannelId },
}

impl SessionError {
    pub fn transcode_failed(channel: &ChannelId) -> Self {
        Self::TranscodeFailed {
            channel: channel.clone(),
        }
    }
}
