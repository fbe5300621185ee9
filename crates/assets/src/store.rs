//! Remote asset store seam.
//!
//! `AssetStore` is what the sync flow talks to. [`PagesAssets`] implements
//! it on top of the HTTP client; tests use in-memory mocks.

use std::future::Future;
use std::pin::Pin;

use pagesync_client::PagesAssets;
use pagesync_protocol::AssetUpload;

use crate::error::SyncError;

/// Boxed future returned by [`AssetStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send + 'a>>;

/// Abstract content-addressed asset store for one project.
pub trait AssetStore: Send + Sync {
    /// Whether the deploy target already exists. A missing target has no
    /// stored assets, so every hash counts as missing.
    fn exists(&self) -> StoreFuture<'_, bool>;

    /// Returns the subset of `hashes` the store does not hold.
    fn missing_hashes<'a>(&'a self, hashes: &'a [String]) -> StoreFuture<'a, Vec<String>>;

    /// Persists one batch.
    fn upload_batch<'a>(&'a self, entries: &'a [AssetUpload]) -> StoreFuture<'a, ()>;

    /// Marks `hashes` as present.
    fn upsert_hashes<'a>(&'a self, hashes: &'a [String]) -> StoreFuture<'a, ()>;
}

impl AssetStore for PagesAssets {
    fn exists(&self) -> StoreFuture<'_, bool> {
        Box::pin(async move { Ok(self.project_exists().await?) })
    }

    fn missing_hashes<'a>(&'a self, hashes: &'a [String]) -> StoreFuture<'a, Vec<String>> {
        Box::pin(async move { Ok(PagesAssets::missing_hashes(self, hashes).await?) })
    }

    fn upload_batch<'a>(&'a self, entries: &'a [AssetUpload]) -> StoreFuture<'a, ()> {
        Box::pin(async move { Ok(PagesAssets::upload_batch(self, entries).await?) })
    }

    fn upsert_hashes<'a>(&'a self, hashes: &'a [String]) -> StoreFuture<'a, ()> {
        Box::pin(async move { Ok(PagesAssets::upsert_hashes(self, hashes).await?) })
    }
}
