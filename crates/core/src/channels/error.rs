//! Channel list errors.

use thiserror::Error;

/// Errors from fetching or parsing the tuner's channel list.
#[derive(Debug, Error)]
pub enum ChannelListError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("connection to tuner failed: {0}")]
    ConnectionFailed(String),

    #[error("tuner request timed out")]
    Timeout,

    #[error("tuner returned HTTP {status}")]
    Status { status: u16 },

    #[error("invalid channel list: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ChannelListError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::ConnectionFailed(e.to_string())
        }
    }
}
