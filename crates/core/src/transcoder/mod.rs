//! Transcoder process supervision.
//!
//! This module owns the external process that turns a tuner channel into HLS
//! output. At most one process exists at a time: [`ProcessSupervisor::start`]
//! always stops the previous process (kill, grace period, segment cleanup)
//! before spawning the next one.
//!
//! Process creation goes through the [`Launcher`] trait so the session logic
//! can be driven by [`crate::testing::MockLauncher`] in tests and by
//! [`FfmpegLauncher`] in production.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tunerhls_core::transcoder::{ChannelId, FfmpegLauncher, ProcessSupervisor};
//!
//! let mut supervisor = ProcessSupervisor::new(
//!     Arc::new(FfmpegLauncher::new()),
//!     config.transcoder.clone(),
//!     config.tuner.stream_url_template(),
//! );
//!
//! let channel: ChannelId = "101".parse()?;
//! supervisor.start(&channel).await?;
//! assert!(supervisor.is_alive());
//!
//! supervisor.stop().await; // kill, wait for the tuner, purge segments
//! ```

mod error;
mod ffmpeg;
mod supervisor;
mod traits;
mod types;

pub use error::TranscoderError;
pub use ffmpeg::FfmpegLauncher;
pub use supervisor::ProcessSupervisor;
pub use traits::{Launcher, TranscodeProcess};
pub use types::{split_args, ChannelId, InvalidChannelId, Invocation};
