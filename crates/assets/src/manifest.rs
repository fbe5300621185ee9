//! Public path to content hash mapping handed to deployment creation.

use std::collections::{BTreeMap, HashMap};

use crate::types::FileRecord;

/// `/relative/path` → content hash, ordered by path.
pub type Manifest = BTreeMap<String, String>;

/// Builds the manifest for a scan result.
pub fn build_manifest(files: &HashMap<String, FileRecord>) -> Manifest {
    files
        .values()
        .map(|f| (format!("/{}", f.rel), f.hash.clone()))
        .collect()
}
