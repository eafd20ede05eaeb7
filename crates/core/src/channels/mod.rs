//! Tuner channel list.
//!
//! The tuner publishes its channels as an extended M3U file. This module
//! fetches and parses that list, turns each entry into a [`TunerChannel`]
//! with both a direct and a transcoding URL, and renders playlists that point
//! players at the gateway.

mod client;
mod error;
mod playlist;
mod types;

pub use client::ChannelListClient;
pub use error::ChannelListError;
pub use playlist::{parse_m3u, tuner_channels, M3uPlaylist};
pub use types::{M3uEntry, PlaylistEntry, TunerChannel};
