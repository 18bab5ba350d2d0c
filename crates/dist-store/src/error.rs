//! Error type for snapshot persistence

use dist_common::{IdError, PieceCid};
use std::path::PathBuf;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}:{line}: invalid piece description: {source}", path.display())]
    Import {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("{}:{line}: invalid piece CID: {source}", path.display())]
    InvalidCid {
        path: PathBuf,
        line: usize,
        source: IdError,
    },

    #[error("{}:{line}: duplicate piece CID {cid}", path.display())]
    DuplicateCid {
        path: PathBuf,
        line: usize,
        cid: PieceCid,
    },

    #[error("Another instance is already running... (lock held on {})", path.display())]
    AlreadyRunning { path: PathBuf },

    #[error("failed to lock {}: {reason}", path.display())]
    Lock { path: PathBuf, reason: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if another process holds the instance lock
    #[must_use]
    pub const fn is_already_running(&self) -> bool {
        matches!(self, Self::AlreadyRunning { .. })
    }
}
