use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Placeholder replaced by the channel id in templates.
pub const CHANNEL_PLACEHOLDER: &str = "[CHANNEL]";

/// Placeholder replaced by the resolved source URL in the argument template.
pub const SOURCE_PLACEHOLDER: &str = "[SOURCE]";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tuner: TunerConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL clients use to reach this server.
    /// Redirects point at `{url_prefix}/stream/{channel}.m3u8`.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            url_prefix: default_url_prefix(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_url_prefix() -> String {
    "http://localhost:8080".to_string()
}

/// Upstream tuner configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TunerConfig {
    /// Tuner host name or IP address.
    #[serde(default = "default_tuner_address")]
    pub address: String,
    /// Port the tuner streams channels on.
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,
    /// Overrides the per-channel stream URL. Must contain `[CHANNEL]`.
    #[serde(default)]
    pub stream_url: Option<String>,
    /// Overrides the URL of the tuner's M3U channel list.
    #[serde(default)]
    pub channel_list_url: Option<String>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            address: default_tuner_address(),
            stream_port: default_stream_port(),
            stream_url: None,
            channel_list_url: None,
        }
    }
}

impl TunerConfig {
    /// Stream URL template with the `[CHANNEL]` placeholder still in place.
    pub fn stream_url_template(&self) -> String {
        self.stream_url.clone().unwrap_or_else(|| {
            format!(
                "http://{}:{}/chlist/{}",
                self.address, self.stream_port, CHANNEL_PLACEHOLDER
            )
        })
    }

    pub fn channel_list_url(&self) -> String {
        self.channel_list_url
            .clone()
            .unwrap_or_else(|| format!("http://{}/n7_tv_chlist.m3u", self.address))
    }
}

fn default_tuner_address() -> String {
    "192.168.1.10".to_string()
}

fn default_stream_port() -> u16 {
    8080
}

/// Transcoder process configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// Argument template. `[SOURCE]` and `[CHANNEL]` are substituted per start.
    #[serde(default = "default_args_template")]
    pub args_template: String,
    /// Directory the transcoder writes playlists and segments into.
    /// Everything in it is deleted whenever a transcode stops.
    #[serde(default = "default_segment_dir")]
    pub segment_dir: PathBuf,
    /// Wait after killing the transcoder so the tuner can release the channel.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            args_template: default_args_template(),
            segment_dir: default_segment_dir(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_args_template() -> String {
    [
        "-i [SOURCE]",
        "-async 1 -threads 0",
        "-acodec aac -strict -2 -cutoff 15000 -ac 2 -ab 256k",
        "-vcodec libx264 -preset ultrafast -tune zerolatency -threads 2",
        "-flags -global_header -fflags +genpts",
        "-map 0:0 -map 0:1",
        "-hls_time 5 -hls_wrap 12 [CHANNEL].m3u8",
        "-segment_format mpegts -segment_list_flags +live -segment_time 10",
    ]
    .join(" ")
}

fn default_segment_dir() -> PathBuf {
    std::env::temp_dir().join("tunerhls")
}

fn default_stop_grace_ms() -> u64 {
    2000
}

/// Session lifecycle timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Inactivity after which the running transcode is stopped.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// How often the idle check runs.
    #[serde(default = "default_idle_check_interval")]
    pub idle_check_interval_secs: u64,
    /// How often a channel request polls for its playlist.
    #[serde(default = "default_readiness_poll_interval")]
    pub readiness_poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            idle_check_interval_secs: default_idle_check_interval(),
            readiness_poll_interval_ms: default_readiness_poll_interval(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    60
}

fn default_idle_check_interval() -> u64 {
    15
}

fn default_readiness_poll_interval() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = Config::default();
        assert_eq!(config.session.idle_timeout_secs, 60);
        assert_eq!(config.session.idle_check_interval_secs, 15);
        assert_eq!(config.session.readiness_poll_interval_ms, 1000);
        assert_eq!(config.transcoder.stop_grace_ms, 2000);
    }

    #[test]
    fn test_tuner_urls_derive_from_address() {
        let tuner = TunerConfig {
            address: "10.0.0.5".to_string(),
            ..Default::default()
        };
        assert_eq!(
            tuner.stream_url_template(),
            "http://10.0.0.5:8080/chlist/[CHANNEL]"
        );
        assert_eq!(tuner.channel_list_url(), "http://10.0.0.5/n7_tv_chlist.m3u");
    }

    #[test]
    fn test_tuner_url_overrides() {
        let tuner = TunerConfig {
            stream_url: Some("rtsp://tuner/[CHANNEL]".to_string()),
            channel_list_url: Some("http://tuner/list.m3u".to_string()),
            ..Default::default()
        };
        assert_eq!(tuner.stream_url_template(), "rtsp://tuner/[CHANNEL]");
        assert_eq!(tuner.channel_list_url(), "http://tuner/list.m3u");
    }

    #[test]
    fn test_default_args_template_has_placeholders() {
        let template = default_args_template();
        assert!(template.starts_with("-i [SOURCE] "));
        assert!(template.contains("[CHANNEL].m3u8"));
    }
}
