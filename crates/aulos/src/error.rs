#![forbid(unsafe_code)]

use aulos_io::SourceError;
use aulos_tags::TagError;
use thiserror::Error;

/// Errors a [`Reader`](crate::Reader) run can end with.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("no registered file reader accepts this target")]
    NoMatchingReader,

    #[error("no registered tag reader matched the probed bytes")]
    NoMatchingFormat,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Tag(#[from] TagError),
}
