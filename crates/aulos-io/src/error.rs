#![forbid(unsafe_code)]

use aulos_net::NetError;
use aulos_storage::StorageError;
use thiserror::Error;

/// Result type used by `aulos-io`.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors produced by media sources.
///
/// The transport (`Net`) and caller-discipline (`Storage`) variants stay
/// distinct so defensive callers can tell a network failure apart from a
/// read of bytes that were never loaded.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Net(#[from] NetError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("source used before init() resolved")]
    Uninitialized,

    #[error("could not determine size of {0}")]
    SizeUnresolved(String),

    #[error("backend cannot open this target")]
    UnsupportedTarget,
}

impl SourceError {
    /// Whether this is a read of a byte that has not been loaded yet, as
    /// opposed to a transport failure.
    #[must_use]
    pub fn is_not_loaded(&self) -> bool {
        matches!(self, SourceError::Storage(StorageError::NotLoaded { .. }))
    }
}
