//! Batch planning.
//!
//! Greedy round-robin bin-packing: files are placed smallest first, each
//! one into the first lane (starting at a rotating offset) that still has
//! room for its bytes and is under the file-count cap. A file no lane can
//! take opens a new lane. Every non-empty lane becomes one upload batch.

use crate::error::SyncError;
use crate::types::{FileRecord, UploadBatch};

struct Lane {
    files: Vec<FileRecord>,
    remaining: u64,
}

impl Lane {
    fn new(capacity: u64) -> Self {
        Self {
            files: Vec::new(),
            remaining: capacity,
        }
    }

    fn accepts(&self, size: u64, max_files: usize) -> bool {
        self.remaining >= size && self.files.len() < max_files
    }

    fn push(&mut self, file: FileRecord) {
        self.remaining -= file.size;
        self.files.push(file);
    }
}

/// Packs `files` into batches of at most `max_batch_bytes` and
/// `max_batch_files` each, starting from `lanes` open lanes.
///
/// The assignment is deterministic for a given input order.
pub fn plan_batches(
    mut files: Vec<FileRecord>,
    lanes: usize,
    max_batch_bytes: u64,
    max_batch_files: usize,
) -> Result<Vec<UploadBatch>, SyncError> {
    if max_batch_files == 0 {
        return Err(SyncError::InvalidLimits("max_batch_files must be at least 1".into()));
    }
    if let Some(f) = files.iter().find(|f| f.size > max_batch_bytes) {
        return Err(SyncError::PlanningInvariant(format!(
            "{} is {} bytes, larger than a whole batch ({max_batch_bytes} bytes)",
            f.rel, f.size
        )));
    }

    // Stable: equal sizes keep their input order.
    files.sort_by_key(|f| f.size);

    let mut open: Vec<Lane> = (0..lanes.max(1)).map(|_| Lane::new(max_batch_bytes)).collect();
    let mut offset = 0usize;

    for file in files {
        let count = open.len();
        let slot = (0..count)
            .map(|i| (offset + i) % count)
            .find(|&idx| open[idx].accepts(file.size, max_batch_files));

        match slot {
            Some(idx) => open[idx].push(file),
            None => {
                let mut lane = Lane::new(max_batch_bytes);
                lane.push(file);
                open.push(lane);
            }
        }

        offset += 1;
    }

    let batches: Vec<UploadBatch> = open
        .into_iter()
        .filter(|lane| !lane.files.is_empty())
        .map(|lane| UploadBatch {
            bytes: lane.files.iter().map(|f| f.size).sum(),
            files: lane.files,
        })
        .collect();

    check_batches(&batches, max_batch_bytes, max_batch_files)?;
    Ok(batches)
}

/// Verifies every batch against both limits.
pub fn check_batches(
    batches: &[UploadBatch],
    max_batch_bytes: u64,
    max_batch_files: usize,
) -> Result<(), SyncError> {
    for (i, batch) in batches.iter().enumerate() {
        let bytes: u64 = batch.files.iter().map(|f| f.size).sum();
        if bytes != batch.bytes {
            return Err(SyncError::PlanningInvariant(format!(
                "batch {i} records {} bytes but holds {bytes}",
                batch.bytes
            )));
        }
        if bytes > max_batch_bytes {
            return Err(SyncError::PlanningInvariant(format!(
                "batch {i} holds {bytes} bytes, limit is {max_batch_bytes}"
            )));
        }
        if batch.files.len() > max_batch_files {
            return Err(SyncError::PlanningInvariant(format!(
                "batch {i} holds {} files, limit is {max_batch_files}",
                batch.files.len()
            )));
        }
    }
    Ok(())
}
