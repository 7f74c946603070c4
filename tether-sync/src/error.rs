//! Error types for tether-sync.

use std::path::PathBuf;

use thiserror::Error;

use tether_core::ClientError;

/// Errors that end a run or a run-record operation.
///
/// Per-device failures never surface here; they are recorded on the
/// [`crate::RunReport`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// A snapshot could not be fetched; no mutation was attempted.
    #[error("snapshot fetch failed: {0}")]
    Fetch(#[from] ClientError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Run record JSON error.
    #[error("run record JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
