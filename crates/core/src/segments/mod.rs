//! Segment directory access.
//!
//! The transcoder writes an HLS playlist (`{channel}.m3u8`) and its transport
//! stream segments (`{channel}*.ts`) into a single flat directory. This module
//! reads those files for the HTTP layer and purges them when a transcode stops.
//!
//! Client-supplied names are reduced to their final path component before they
//! touch the file system, so nothing outside the directory can be resolved.

mod error;
mod store;

pub use error::SegmentError;
pub use store::{content_type, CleanupReport, SegmentEntry, SegmentStore};

/// Content type of HLS playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/x-mpegURL";

/// Content type of MPEG transport stream segments.
pub const SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

/// Content type for anything else found in the directory.
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";
