//! File system backed segment store.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::error::SegmentError;
use super::{BINARY_CONTENT_TYPE, PLAYLIST_CONTENT_TYPE, SEGMENT_CONTENT_TYPE};
use crate::metrics::SEGMENT_FILES_DELETED;

/// A file currently present in the segment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentEntry {
    pub name: String,
    pub size_bytes: u64,
}

/// Outcome of a cleanup pass. Failures are counted, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Read access to the directory the transcoder writes into.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    root: PathBuf,
}

impl SegmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the segment directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), SegmentError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| SegmentError::RootUnavailable {
                path: self.root.clone(),
                source,
            })
    }

    /// Maps a client-supplied name to a path inside the store.
    ///
    /// Only the final component of `name` is kept, so `../../etc/passwd`
    /// resolves to `{root}/passwd`. Names without a file component (`..`,
    /// `dir/..`, empty) or with an embedded NUL resolve to nothing.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.contains('\0') {
            return None;
        }
        let file_name = Path::new(name).file_name()?;
        Some(self.root.join(file_name))
    }

    pub async fn exists(&self, name: &str) -> bool {
        match self.resolve(name) {
            Some(path) => fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            None => false,
        }
    }

    pub async fn read(&self, name: &str) -> Result<Vec<u8>, SegmentError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| SegmentError::not_found(name))?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(SegmentError::not_found(name)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SegmentError::not_found(name))
            }
            Err(e) => return Err(SegmentError::Io(e)),
        }

        // The transcoder may rotate the file away between the stat and the read.
        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SegmentError::not_found(name)
            } else {
                SegmentError::Io(e)
            }
        })
    }

    /// Lists regular files in the directory, sorted by name.
    /// A missing directory lists as empty.
    pub async fn list_all(&self) -> Result<Vec<SegmentEntry>, SegmentError> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SegmentError::Io(e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Deleted while listing.
                Err(_) => continue,
            };
            if !meta.is_file() {
                continue;
            }
            entries.push(SegmentEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                size_bytes: meta.len(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Deletes every regular file in the directory.
    ///
    /// Best effort: per-file failures are logged and counted, and the pass
    /// always runs to completion.
    pub async fn delete_all(&self) -> CleanupReport {
        info!("Cleaning up old stream data in {:?}", self.root);

        let mut report = CleanupReport::default();
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read segment directory {:?}: {}", self.root, e);
                }
                return report;
            }
        };

        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read segment directory entry: {}", e);
                    break;
                }
            };

            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let path = entry.path();
            debug!("Deleting {:?}", entry.file_name());
            match fs::remove_file(&path).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!("Failed to delete {:?}: {}", path, e);
                    report.failed += 1;
                }
            }
        }

        SEGMENT_FILES_DELETED.inc_by(report.deleted as u64);
        report
    }
}

/// Response content type derived from the file extension alone.
pub fn content_type(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("m3u8") => PLAYLIST_CONTENT_TYPE,
        Some("ts") => SEGMENT_CONTENT_TYPE,
        _ => BINARY_CONTENT_TYPE,
    }
}
