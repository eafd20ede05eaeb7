//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{TranscoderConfig, CHANNEL_PLACEHOLDER, SOURCE_PLACEHOLDER};

/// Numeric tuner channel identifier.
///
/// Kept as the digit string the client sent so leading zeros survive into the
/// upstream URL and the playlist name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid channel id: {0:?}")]
pub struct InvalidChannelId(pub String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the playlist the transcoder writes for this channel.
    pub fn playlist_name(&self) -> String {
        format!("{}.m3u8", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = InvalidChannelId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidChannelId(s.to_string()))
        }
    }
}

impl TryFrom<String> for ChannelId {
    type Error = InvalidChannelId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully resolved command line for one transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub channel: ChannelId,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub source_url: String,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Substitutes `channel` into the source URL template and the argument
    /// template. The argument template is split before substitution, so a
    /// source URL is always passed as a single argument.
    pub fn build(config: &TranscoderConfig, source_url_template: &str, channel: &ChannelId) -> Self {
        let source_url = source_url_template.replace(CHANNEL_PLACEHOLDER, channel.as_str());

        let args = split_args(&config.args_template)
            .into_iter()
            .map(|arg| {
                arg.replace(SOURCE_PLACEHOLDER, &source_url)
                    .replace(CHANNEL_PLACEHOLDER, channel.as_str())
            })
            .collect();

        Self {
            channel: channel.clone(),
            program: config.ffmpeg_path.clone(),
            args,
            source_url,
            working_dir: config.segment_dir.clone(),
        }
    }

    /// Command line as a single string, for logging.
    pub fn command_line(&self) -> String {
        format!("{} {}", self.program.display(), self.args.join(" "))
    }
}

/// Splits an argument template on whitespace. Double quotes group words
/// into one argument and are removed.
pub fn split_args(template: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in template.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        args.push(current);
    }

    args
}
