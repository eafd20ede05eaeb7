//! Types for the session manager.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::transcoder::ChannelId;

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No transcoder running.
    Idle,
    /// Transcoder spawned, playlist not confirmed yet.
    Starting,
    /// A client has been redirected to the playlist.
    Streaming,
    /// Transcoder being killed and its output purged.
    ///
    /// Only held while the session lock is held, so status snapshots never
    /// see it; observers go straight from a running state to `Idle`.
    Stopping,
}

impl SessionState {
    pub const ALL: [SessionState; 4] = [Self::Idle, Self::Starting, Self::Streaming, Self::Stopping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Streaming => "streaming",
            Self::Stopping => "stopping",
        }
    }
}

/// Where a client is sent to play a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// `{url_prefix}/stream/{channel}.m3u8`
    pub fn for_channel(url_prefix: &str, channel: &ChannelId) -> Self {
        Self(format!("{}/stream/{}", url_prefix, channel.playlist_name()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of an explicit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stopped {
    /// Whether a transcoder was actually running.
    pub was_running: bool,
}

/// Snapshot of the session for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub channel: Option<ChannelId>,
    pub pid: Option<u32>,
    /// Number of transcoder processes spawned so far.
    pub generation: u64,
    pub started_at: Option<DateTime<Utc>>,
    /// Seconds since the last client activity.
    pub idle_secs: u64,
    pub auto_stop_armed: bool,
}
