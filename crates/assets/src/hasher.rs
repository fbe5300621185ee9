//! Content hashes used as asset store keys.
//!
//! The key is BLAKE3 over the base64 form of the file followed by its
//! extension, hex-encoded and cut to 32 characters. The store computes
//! keys the same way, so the scheme must not change.

use std::io;
use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};

/// Length of a content hash in hex characters.
pub const HASH_LEN: usize = 32;

/// Computes the store key for `bytes` with the given file extension.
///
/// The extension is lowercased and a leading `.` is ignored.
pub fn content_hash(bytes: &[u8], extension: &str) -> String {
    let ext = extension.strip_prefix('.').unwrap_or(extension).to_lowercase();

    let mut hasher = blake3::Hasher::new();
    hasher.update(STANDARD.encode(bytes).as_bytes());
    hasher.update(ext.as_bytes());

    let mut hex = hex::encode(hasher.finalize().as_bytes());
    hex.truncate(HASH_LEN);
    hex
}

/// Extension of `path` as used for hashing; empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Reads `path` and computes its store key.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(content_hash(&bytes, &extension_of(path)))
}
