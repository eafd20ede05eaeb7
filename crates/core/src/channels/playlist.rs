//! M3U parsing and rendering.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::fmt;

use super::error::ChannelListError;
use super::types::{M3uEntry, PlaylistEntry, TunerChannel};
use crate::config::CHANNEL_PLACEHOLDER;

/// Tuner titles look like `12(cab).Das_Erste` or `7(cab).Sky_Cinema_$`.
static TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<channel>[0-9]+)\(cab\)\.(?P<name>[A-Za-z0-9_]+)")
        .expect("title pattern is valid")
});

const ENCRYPTED_SUFFIX: &str = "_$";

/// Parse an extended M3U document.
///
/// Each `#EXTINF` line is paired with the next non-comment line as its URL.
/// URLs without a preceding `#EXTINF` get an empty title.
pub fn parse_m3u(text: &str) -> Result<Vec<M3uEntry>, ChannelListError> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    match lines.next() {
        Some(header) if header.starts_with("#EXTM3U") => {}
        _ => return Err(ChannelListError::Parse("missing #EXTM3U header".into())),
    }

    let mut entries = Vec::new();
    let mut pending: Option<M3uEntry> = None;

    for line in lines {
        if let Some(info) = line.strip_prefix("#EXTINF:") {
            pending = Some(parse_extinf(info));
        } else if line.starts_with('#') {
            continue;
        } else {
            let mut entry = pending.take().unwrap_or_default();
            entry.url = line.to_string();
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Parse the part of an `#EXTINF` line after the colon:
/// `-1 tvg-name="x" group-title="y",Title`.
fn parse_extinf(info: &str) -> M3uEntry {
    let mut in_quotes = false;
    let split = info.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ',' if !in_quotes => Some(i),
        _ => None,
    });

    let (head, title) = match split {
        Some(i) => (&info[..i], info[i + 1..].trim()),
        None => (info, ""),
    };

    M3uEntry {
        attributes: parse_attributes(head),
        title: title.to_string(),
        url: String::new(),
    }
}

fn parse_attributes(head: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut rest = head;

    while let Some(eq) = rest.find("=\"") {
        let key = rest[..eq].rsplit(' ').next().unwrap_or("").trim();
        let after = &rest[eq + 2..];
        let Some(end) = after.find('"') else {
            break;
        };
        if !key.is_empty() {
            attributes.push((key.to_string(), after[..end].to_string()));
        }
        rest = &after[end + 1..];
    }

    attributes
}

/// Turn tuner list entries into channels.
///
/// `stream_url_template` is the tuner's per-channel URL with the
/// `[CHANNEL]` placeholder; `url_prefix` is the gateway's external address.
pub fn tuner_channels(
    entries: &[M3uEntry],
    stream_url_template: &str,
    url_prefix: &str,
) -> Vec<TunerChannel> {
    let url_prefix = url_prefix.trim_end_matches('/');

    entries
        .iter()
        .map(|entry| {
            let id = entry
                .url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or("")
                .to_string();

            let (channel, name) = match TITLE_PATTERN.captures(&entry.title) {
                Some(caps) => (
                    caps.name("channel").and_then(|m| m.as_str().parse().ok()),
                    caps.name("name")
                        .map(|m| m.as_str().replace('_', " ").trim().to_string())
                        .unwrap_or_default(),
                ),
                None => (
                    None,
                    entry
                        .attribute("tvg-name")
                        .unwrap_or(entry.title.as_str())
                        .to_string(),
                ),
            };

            TunerChannel {
                channel,
                name,
                encrypted: entry.title.ends_with(ENCRYPTED_SUFFIX),
                direct_url: stream_url_template.replace(CHANNEL_PLACEHOLDER, &id),
                transcode_url: format!("{}/channel/{}", url_prefix, id),
                id,
            }
        })
        .collect()
}

/// A playlist served to players.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct M3uPlaylist {
    entries: Vec<PlaylistEntry>,
}

impl M3uPlaylist {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    /// Entries sorted by group, then title.
    pub fn ordered(mut self) -> Self {
        self.entries
            .sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.title.cmp(&b.title)));
        self
    }
}

impl<'a> FromIterator<&'a TunerChannel> for M3uPlaylist {
    fn from_iter<I: IntoIterator<Item = &'a TunerChannel>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(PlaylistEntry::from).collect())
    }
}

impl fmt::Display for M3uPlaylist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#EXTM3U")?;
        writeln!(f, "#EXT-X-VERSION:3")?;

        for entry in &self.entries {
            let mut attributes = Vec::new();
            if !entry.group.is_empty() {
                attributes.push(format!("group-title=\"{}\"", entry.group));
            }
            if !entry.tvg_name.is_empty() {
                attributes.push(format!("tvg-name=\"{}\"", entry.tvg_name));
            }

            if attributes.is_empty() {
                writeln!(f, "#EXTINF:0,{}", entry.title)?;
            } else {
                writeln!(f, "#EXTINF:0 {},{}", attributes.join(" "), entry.title)?;
            }
            writeln!(f, "{}", entry.url)?;
        }

        Ok(())
    }
}
