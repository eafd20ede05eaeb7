pub mod channels;
pub mod config;
pub mod metrics;
pub mod segments;
pub mod session;
pub mod testing;
pub mod transcoder;

pub use channels::{ChannelListClient, ChannelListError, M3uPlaylist, TunerChannel};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use segments::{SegmentError, SegmentStore};
pub use session::{
    IdleMonitor, RedirectTarget, SessionError, SessionManager, SessionState, SessionStatus,
    Stopped,
};
pub use transcoder::{ChannelId, FfmpegLauncher, Launcher, ProcessSupervisor, TranscoderError};
