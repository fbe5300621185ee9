//! Wires credentials, the asset store client and the sync together.

use std::sync::Arc;

use pagesync_assets::{Manifest, SyncError, SyncEvent, SyncOrchestrator};
use pagesync_client::{ApiClient, Credentials, PagesAssets};
use tokio::sync::mpsc;

use crate::config::Config;

/// Runs one sync and returns the manifest.
pub async fn run(config: Config) -> anyhow::Result<Manifest> {
    let credentials = Credentials::from_env()?;
    let api = ApiClient::new(&credentials, &config.account_id)?
        .with_base_url(&config.api_base_url);
    let store = Arc::new(PagesAssets::new(api, &config.project)?);

    let mut orchestrator = SyncOrchestrator::new(store, config.sync_limits())?;
    if let Some(events) = orchestrator.take_events() {
        tokio::spawn(log_events(events));
    }

    let cancel = orchestrator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after in-flight batches");
            cancel.cancel();
        }
    });

    let report = match orchestrator.sync(&config.build_dir, &config.exclude).await {
        Ok(report) => report,
        Err(e) if e.is_auth() => {
            anyhow::bail!("{e}\ncheck the API credentials and that they can edit Pages projects")
        }
        Err(SyncError::Cancelled) => anyhow::bail!("sync cancelled, nothing was committed"),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        run_id = %report.run_id,
        scanned = report.files_scanned,
        uploaded = report.files_uploaded,
        bytes = report.bytes_uploaded,
        batches = report.batches,
        "sync finished"
    );
    Ok(report.manifest)
}

async fn log_events(mut events: mpsc::Receiver<SyncEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SyncEvent::BatchUploaded { files, bytes } => {
                tracing::info!(files, bytes, "batch uploaded");
            }
            other => tracing::debug!(event = ?other, "sync progress"),
        }
    }
}
