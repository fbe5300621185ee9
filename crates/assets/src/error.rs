//! Sync error types.

use std::path::PathBuf;

use pagesync_client::ClientError;

/// Errors produced while scanning the build output directory.
///
/// A scan either returns every file or fails; no partial result is kept.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("build output directory {0} does not exist or is not a directory")]
    MissingRoot(PathBuf),

    #[error("file {path} is {size} bytes, the store accepts files up to {limit} bytes")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error(
        "more than {limit} files found under {root}, ensure the build output directory is set correctly"
    )]
    TooManyFiles { root: PathBuf, limit: usize },

    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },

    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced by a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("transport error: {0}")]
    Transport(String),

    /// The upload token could not be obtained or was rejected twice.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A planned batch broke its own limits. Never expected at runtime.
    #[error("batch planning invariant violated: {0}")]
    PlanningInvariant(String),

    #[error("invalid sync limits: {0}")]
    InvalidLimits(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cancelled")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Task(String),
}

impl SyncError {
    /// True when the user should check their credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }

    /// True when the run was stopped on purpose rather than by a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}

impl From<ClientError> for SyncError {
    fn from(e: ClientError) -> Self {
        if e.is_auth() {
            SyncError::Auth(e.to_string())
        } else {
            SyncError::Transport(e.to_string())
        }
    }
}
