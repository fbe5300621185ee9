//! Content-addressed sync of a static build output into the asset store.
//!
//! This crate holds the sync logic and no HTTP code of its own: the store
//! is reached through the [`AssetStore`] trait, implemented for
//! `pagesync_client::PagesAssets` and by mocks in tests.
//!
//! # Pipeline
//!
//! 1. **Scan**: walk the build output, hash every file
//! 2. **Resolve**: ask the store which hashes it is missing
//! 3. **Plan**: pack the missing files into bounded batches
//! 4. **Upload**: send batches over a bounded worker pool
//! 5. **Commit**: mark every hash as present

pub mod error;
pub mod hasher;
pub mod manifest;
pub mod mime;
pub mod orchestrator;
pub mod planner;
pub mod resolver;
pub mod scanner;
pub mod store;
pub mod types;
pub mod uploader;

/// Largest file the store accepts.
pub const MAX_FILE_BYTES: u64 = 25 * 1024 * 1024;

/// Most files a project may hold.
pub const MAX_FILES: usize = 20_000;

/// Byte cap of one upload batch.
pub const MAX_BATCH_BYTES: u64 = 50 * 1024 * 1024;

/// File cap of one upload batch.
pub const MAX_BATCH_FILES: usize = 5_000;

/// Planning lanes and concurrent uploads.
pub const DEFAULT_CONCURRENCY: usize = 3;

// Re-export primary types for convenience.
pub use error::{ScanError, SyncError};
pub use hasher::{content_hash, hash_file};
pub use manifest::{Manifest, build_manifest};
pub use orchestrator::SyncOrchestrator;
pub use planner::plan_batches;
pub use resolver::resolve_missing;
pub use scanner::scan;
pub use store::{AssetStore, StoreFuture};
pub use types::{
    FileRecord, SyncDiff, SyncEvent, SyncLimits, SyncReport, UploadBatch, UploadStats,
};
pub use uploader::BatchUploader;
