//! Channel list types.

use serde::Serialize;

/// One `#EXTINF` entry of an M3U file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct M3uEntry {
    /// `key="value"` attributes between the duration and the title.
    pub attributes: Vec<(String, String)>,
    pub title: String,
    pub url: String,
}

impl M3uEntry {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A channel offered by the tuner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunerChannel {
    /// Channel number from the title, when it has one.
    pub channel: Option<u32>,
    pub name: String,
    /// Identifier used in tuner and gateway URLs.
    pub id: String,
    /// Scrambled channels cannot be decoded by the transcoder.
    pub encrypted: bool,
    pub direct_url: String,
    pub transcode_url: String,
}

/// An entry of a playlist served to players.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaylistEntry {
    pub group: String,
    pub tvg_name: String,
    pub title: String,
    pub url: String,
}

impl From<&TunerChannel> for PlaylistEntry {
    fn from(channel: &TunerChannel) -> Self {
        Self {
            group: if channel.encrypted {
                "Encrypted".to_string()
            } else {
                String::new()
            },
            tvg_name: channel.name.clone(),
            title: channel.name.clone(),
            url: channel.transcode_url.clone(),
        }
    }
}
