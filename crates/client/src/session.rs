//! Shared upload-token state for one sync run.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientError;

/// Bearer token shared by every worker of a sync run.
///
/// The token is acquired lazily. Acquisition happens under the lock, so
/// workers that arrive while a token is being fetched wait for it instead
/// of starting their own exchange. Invalidation only clears the token the
/// caller actually used: a worker that failed with an old token never
/// discards a newer one fetched by someone else.
#[derive(Default)]
pub struct AuthSession {
    token: Mutex<Option<String>>,
    acquisitions: AtomicU64,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, running `acquire` first if there is none.
    pub async fn token<F, Fut>(&self, acquire: F) -> Result<String, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ClientError>>,
    {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        let token = acquire().await?;
        let n = self.acquisitions.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(acquisitions = n, "upload token stored");
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Drops `stale` if it is still the current token.
    ///
    /// Returns `false` when another caller already replaced it.
    pub async fn invalidate(&self, stale: &str) -> bool {
        let mut guard = self.token.lock().await;
        if guard.as_deref() == Some(stale) {
            *guard = None;
            true
        } else {
            false
        }
    }

    /// Number of successful token acquisitions so far.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }
}
