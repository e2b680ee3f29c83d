#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used by `aulos-storage`.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by storage primitives.
///
/// `NotLoaded` is a caller-discipline violation, not a transport failure:
/// it means a byte was read before the range containing it was loaded.
/// Transport failures never originate here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("offset {offset} has not been loaded yet")]
    NotLoaded { offset: u64 },
}
