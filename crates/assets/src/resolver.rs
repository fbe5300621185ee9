//! Missing-set resolution against the remote store.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::SyncError;
use crate::store::AssetStore;

/// Returns the hashes from `hashes` that `store` does not hold yet.
///
/// A target that does not exist holds nothing, so every hash is returned
/// without a remote call. Otherwise the whole list goes out in one call.
/// Hashes in the reply that were never asked for are dropped.
pub async fn resolve_missing(
    store: &dyn AssetStore,
    hashes: &[String],
    target_exists: bool,
) -> Result<Vec<String>, SyncError> {
    if !target_exists {
        debug!(hashes = hashes.len(), "target does not exist, every hash is missing");
        return Ok(hashes.to_vec());
    }
    if hashes.is_empty() {
        return Ok(Vec::new());
    }

    let reply = store.missing_hashes(hashes).await?;

    let asked: HashSet<&str> = hashes.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    let mut missing = Vec::with_capacity(reply.len());
    for hash in reply {
        if !asked.contains(hash.as_str()) {
            warn!(hash = %hash, "store reported a hash that was not requested");
            continue;
        }
        if seen.insert(hash.clone()) {
            missing.push(hash);
        }
    }

    debug!(asked = hashes.len(), missing = missing.len(), "missing set resolved");
    Ok(missing)
}
