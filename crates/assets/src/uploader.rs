//! Concurrent batch upload.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use pagesync_protocol::AssetUpload;

use crate::error::SyncError;
use crate::store::AssetStore;
use crate::types::{SyncEvent, UploadBatch, UploadStats};

/// Uploads planned batches over a bounded set of workers.
///
/// At most `concurrency` batches are in flight. The first failure stops
/// new batches from starting; batches already sending are allowed to
/// finish and every task is joined before `upload` returns. Cancelling
/// the run token has the same effect and yields [`SyncError::Cancelled`].
pub struct BatchUploader {
    store: Arc<dyn AssetStore>,
    concurrency: usize,
    cancel: CancellationToken,
    events_tx: Option<mpsc::Sender<SyncEvent>>,
}

impl BatchUploader {
    pub fn new(store: Arc<dyn AssetStore>, concurrency: usize, cancel: CancellationToken) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
            cancel,
            events_tx: None,
        }
    }

    /// Reports a [`SyncEvent::BatchUploaded`] per finished batch.
    pub fn with_events(mut self, events_tx: mpsc::Sender<SyncEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub async fn upload(&self, batches: Vec<UploadBatch>) -> Result<UploadStats, SyncError> {
        // Cancelled on first failure; also follows the run token.
        let halt = self.cancel.child_token();
        let mut pending = batches.into_iter().filter(|b| !b.is_empty());
        let mut tasks = JoinSet::new();
        let mut stats = UploadStats::default();
        let mut first_err: Option<SyncError> = None;

        loop {
            while tasks.len() < self.concurrency && !halt.is_cancelled() {
                let Some(batch) = pending.next() else {
                    break;
                };
                tasks.spawn(send_batch(self.store.clone(), batch, halt.clone()));
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            let outcome = joined.unwrap_or_else(|e| Err(SyncError::Task(e.to_string())));
            match outcome {
                Ok((files, bytes)) => {
                    stats.batches += 1;
                    stats.files += files;
                    stats.bytes += bytes;
                    if let Some(tx) = &self.events_tx {
                        let _ = tx.try_send(SyncEvent::BatchUploaded { files, bytes });
                    }
                }
                Err(e) => {
                    if first_err.is_none() {
                        if e.is_cancelled() {
                            info!("upload cancelled, waiting for in-flight batches");
                        } else {
                            error!(error = %e, "batch upload failed, stopping");
                        }
                        first_err = Some(e);
                    }
                    halt.cancel();
                }
            }
        }

        if let Some(e) = first_err {
            return Err(e);
        }
        if halt.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        Ok(stats)
    }
}

/// Reads, encodes and sends one batch. Returns its file and byte counts.
async fn send_batch(
    store: Arc<dyn AssetStore>,
    batch: UploadBatch,
    halt: CancellationToken,
) -> Result<(usize, u64), SyncError> {
    let mut entries = Vec::with_capacity(batch.files.len());
    for file in &batch.files {
        let data = tokio::fs::read(&file.path).await.map_err(|e| {
            SyncError::Io(std::io::Error::new(
                e.kind(),
                format!("reading {}: {e}", file.path.display()),
            ))
        })?;
        entries.push(AssetUpload::new(&file.hash, data, &file.content_type));
    }

    if halt.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    store.upload_batch(&entries).await?;
    debug!(files = entries.len(), bytes = batch.bytes, "batch uploaded");
    Ok((entries.len(), batch.bytes))
}
