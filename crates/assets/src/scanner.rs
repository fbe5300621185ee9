//! Build output scanning.
//!
//! Walks the build output directory and produces one [`FileRecord`] per
//! distinct content hash. Exclusions are gitignore-style globs relative to
//! the root; a matching directory is pruned. No other filtering is
//! applied, so hidden files and `.gitignore` files are treated like any
//! other file. Symlinked files are included under the link's path;
//! symlinked directories are not descended.

use std::collections::HashMap;
use std::path::Path;

use ignore::WalkBuilder;
use ignore::overrides::{Override, OverrideBuilder};
use tracing::{debug, warn};

use crate::error::ScanError;
use crate::hasher::{content_hash, extension_of};
use crate::mime::content_type_for;
use crate::types::{FileRecord, SyncLimits};

/// Scans `root` and returns its files keyed by content hash.
///
/// Files with identical content and extension collapse into one entry;
/// the one visited last wins. Entries are visited in file name order.
/// The file ceiling counts distinct entries, so duplicates do not count
/// against it.
pub fn scan(
    root: &Path,
    exclusions: &[String],
    limits: &SyncLimits,
) -> Result<HashMap<String, FileRecord>, ScanError> {
    let root = root
        .canonicalize()
        .ok()
        .filter(|p| p.is_dir())
        .ok_or_else(|| ScanError::MissingRoot(root.to_path_buf()))?;

    let walker = WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(false)
        .overrides(exclusion_matcher(&root, exclusions)?)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = HashMap::new();
    let mut visited = 0usize;

    for result in walker {
        let entry = result?;
        let path = entry.path();
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        // Symlinked files are read through the link; anything else a link
        // points at is skipped.
        let size = if file_type.is_symlink() {
            match std::fs::metadata(path) {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => {
                    warn!(path = %path.display(), "skipping symlink to a directory");
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping broken symlink");
                    continue;
                }
            }
        } else if file_type.is_file() {
            entry.metadata()?.len()
        } else {
            if !file_type.is_dir() {
                warn!(path = %path.display(), "skipping special file");
            }
            continue;
        };

        visited += 1;
        check_size(path, size, limits.max_file_bytes)?;
        let bytes = read_within_limit(path, limits.max_file_bytes)?;
        let hash = content_hash(&bytes, &extension_of(path));

        // Normalize to forward slashes.
        let rel = path
            .strip_prefix(&root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        files.insert(
            hash.clone(),
            FileRecord {
                path: path.to_path_buf(),
                rel,
                hash,
                size: bytes.len() as u64,
                content_type: content_type_for(path).to_string(),
            },
        );

        // The ceiling applies to distinct content.
        if files.len() > limits.max_files {
            return Err(ScanError::TooManyFiles {
                root,
                limit: limits.max_files,
            });
        }
    }

    debug!(root = %root.display(), visited, unique = files.len(), "scan complete");
    Ok(files)
}

fn check_size(path: &Path, size: u64, limit: u64) -> Result<(), ScanError> {
    if size > limit {
        return Err(ScanError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Reads `path`, enforcing the size ceiling on what was actually read.
fn read_within_limit(path: &Path, limit: u64) -> Result<Vec<u8>, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    check_size(path, bytes.len() as u64, limit)?;
    Ok(bytes)
}

/// Turns exclusion globs into an override set of ignore rules.
fn exclusion_matcher(root: &Path, exclusions: &[String]) -> Result<Override, ScanError> {
    let mut builder = OverrideBuilder::new(root);
    for pattern in exclusions {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        builder
            .add(&format!("!{pattern}"))
            .map_err(|source| ScanError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
    }
    builder.build().map_err(ScanError::Walk)
}
