//! Error types for the segment store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the segment directory.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The requested file does not exist (or the name resolved to nothing).
    #[error("Segment not found: {name}")]
    NotFound { name: String },

    /// The segment directory could not be created.
    #[error("Failed to create segment directory: {path}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmentError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Whether this error should be reported to clients as a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
