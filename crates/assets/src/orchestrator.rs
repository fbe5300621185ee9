//! Sync orchestrator.
//!
//! Runs one sync: scan, resolve missing hashes, plan, upload, commit.
//! The work is split into [`SyncOrchestrator::diff`], which only reads,
//! and [`SyncOrchestrator::apply`], which writes to the store.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::error::SyncError;
use crate::manifest::build_manifest;
use crate::planner::plan_batches;
use crate::resolver::resolve_missing;
use crate::scanner::scan;
use crate::store::AssetStore;
use crate::types::{SyncDiff, SyncEvent, SyncLimits, SyncReport};
use crate::uploader::BatchUploader;

/// Syncs a build output directory into an asset store.
pub struct SyncOrchestrator {
    store: Arc<dyn AssetStore>,
    limits: SyncLimits,
    events_tx: mpsc::Sender<SyncEvent>,
    events_rx: Option<mpsc::Receiver<SyncEvent>>,
    cancel: CancellationToken,
}

impl SyncOrchestrator {
    /// Creates an orchestrator, rejecting unusable limits.
    pub fn new(store: Arc<dyn AssetStore>, limits: SyncLimits) -> Result<Self, SyncError> {
        limits.validate()?;
        let (events_tx, events_rx) = mpsc::channel(256);
        Ok(Self {
            store,
            limits,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        })
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<SyncEvent>> {
        self.events_rx.take()
    }

    /// Returns a cancellation token for this orchestrator's runs.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs a full sync and returns the report with the manifest.
    pub async fn sync(&self, root: &Path, exclusions: &[String]) -> Result<SyncReport, SyncError> {
        let diff = self.diff(root, exclusions).await?;
        self.apply(diff).await
    }

    /// Scans `root` and works out which hashes the store is missing.
    pub async fn diff(&self, root: &Path, exclusions: &[String]) -> Result<SyncDiff, SyncError> {
        self.check_cancelled()?;

        let files = tokio::task::spawn_blocking({
            let root = root.to_path_buf();
            let exclusions = exclusions.to_vec();
            let limits = self.limits;
            move || scan(&root, &exclusions, &limits)
        })
        .await
        .map_err(|e| SyncError::Task(format!("scan task: {e}")))??;

        info!(root = %root.display(), files = files.len(), "scan complete");
        self.emit(SyncEvent::Scanned { files: files.len() });
        self.check_cancelled()?;

        let mut all_hashes: Vec<String> = files.keys().cloned().collect();
        all_hashes.sort();

        let exists = self.store.exists().await?;
        let missing = resolve_missing(self.store.as_ref(), &all_hashes, exists).await?;

        info!(exists, total = all_hashes.len(), missing = missing.len(), "missing set resolved");
        self.emit(SyncEvent::Resolved {
            missing: missing.len(),
        });

        Ok(SyncDiff {
            manifest: build_manifest(&files),
            all_hashes,
            missing,
            files,
        })
    }

    /// Uploads what `diff` found missing and commits every hash.
    ///
    /// Nothing is planned, uploaded or committed when nothing is missing.
    pub async fn apply(&self, diff: SyncDiff) -> Result<SyncReport, SyncError> {
        let run_id = Uuid::new_v4();
        let mut report = SyncReport {
            run_id,
            manifest: diff.manifest.clone(),
            files_scanned: diff.files.len(),
            files_uploaded: 0,
            bytes_uploaded: 0,
            batches: 0,
        };

        if diff.is_noop() {
            info!(run_id = %run_id, files = report.files_scanned, "store up to date, nothing to upload");
            return Ok(report);
        }

        self.check_cancelled()?;

        let batches = plan_batches(
            diff.missing_files(),
            self.limits.concurrency,
            self.limits.max_batch_bytes,
            self.limits.max_batch_files,
        )?;
        info!(run_id = %run_id, batches = batches.len(), files = diff.missing.len(), "upload planned");
        self.emit(SyncEvent::Planned {
            batches: batches.len(),
        });

        let stats = BatchUploader::new(self.store.clone(), self.limits.concurrency, self.cancel.clone())
            .with_events(self.events_tx.clone())
            .upload(batches)
            .await?;

        self.check_cancelled()?;
        self.store.upsert_hashes(&diff.all_hashes).await?;
        self.emit(SyncEvent::Committed {
            hashes: diff.all_hashes.len(),
        });

        info!(
            run_id = %run_id,
            files = stats.files,
            bytes = stats.bytes,
            batches = stats.batches,
            "sync complete"
        );

        report.files_uploaded = stats.files;
        report.bytes_uploaded = stats.bytes;
        report.batches = stats.batches;
        Ok(report)
    }

    fn check_cancelled(&self) -> Result<(), SyncError> {
        if self.cancel.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.events_tx.try_send(event);
    }
}
