//! Data types for the sync flow.

use std::collections::HashMap;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::SyncError;
use crate::manifest::Manifest;
use crate::{
    DEFAULT_CONCURRENCY, MAX_BATCH_BYTES, MAX_BATCH_FILES, MAX_FILE_BYTES, MAX_FILES,
};

/// A scanned file, keyed elsewhere by its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the scan root, with `/` separators.
    pub rel: String,
    pub hash: String,
    pub size: u64,
    pub content_type: String,
}

/// Files sent together in one upload call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    pub files: Vec<FileRecord>,
    /// Sum of `files[..].size`.
    pub bytes: u64,
}

impl UploadBatch {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Limits applied while scanning, planning and uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncLimits {
    pub max_file_bytes: u64,
    pub max_files: usize,
    pub max_batch_bytes: u64,
    pub max_batch_files: usize,
    /// Number of planning lanes and of concurrent upload workers.
    pub concurrency: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            max_files: MAX_FILES,
            max_batch_bytes: MAX_BATCH_BYTES,
            max_batch_files: MAX_BATCH_FILES,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl SyncLimits {
    /// Rejects combinations the planner cannot honour.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.concurrency == 0 {
            return Err(SyncError::InvalidLimits("concurrency must be at least 1".into()));
        }
        if self.max_batch_files == 0 {
            return Err(SyncError::InvalidLimits(
                "max_batch_files must be at least 1".into(),
            ));
        }
        if self.max_file_bytes > self.max_batch_bytes {
            return Err(SyncError::InvalidLimits(format!(
                "max_file_bytes ({}) exceeds max_batch_bytes ({})",
                self.max_file_bytes, self.max_batch_bytes
            )));
        }
        Ok(())
    }
}

/// What a sync would do, computed before anything is uploaded.
#[derive(Debug, Clone)]
pub struct SyncDiff {
    pub manifest: Manifest,
    /// Every scanned hash; committed after a successful upload.
    pub all_hashes: Vec<String>,
    /// Hashes the store does not hold yet.
    pub missing: Vec<String>,
    pub files: HashMap<String, FileRecord>,
}

impl SyncDiff {
    /// True when there is nothing to upload.
    pub fn is_noop(&self) -> bool {
        self.missing.is_empty()
    }

    /// Records for the missing hashes, in `missing` order.
    pub fn missing_files(&self) -> Vec<FileRecord> {
        self.missing
            .iter()
            .filter_map(|h| self.files.get(h).cloned())
            .collect()
    }
}

/// Totals from a batch upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub batches: usize,
    pub files: usize,
    pub bytes: u64,
}

/// Result of a completed sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub manifest: Manifest,
    pub files_scanned: usize,
    pub files_uploaded: usize,
    pub bytes_uploaded: u64,
    pub batches: usize,
}

/// Progress event emitted during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Scanned { files: usize },
    Resolved { missing: usize },
    Planned { batches: usize },
    BatchUploaded { files: usize, bytes: u64 },
    Committed { hashes: usize },
}
