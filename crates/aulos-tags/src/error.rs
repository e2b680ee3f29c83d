#![forbid(unsafe_code)]

use aulos_io::SourceError;
use thiserror::Error;

/// Result type used by `aulos-tags`.
pub type TagResult<T> = Result<T, TagError>;

/// Errors produced while reading tags out of a container.
///
/// `Format` is malformed container framing (bad magic, truncated header or
/// segment table); `Parse` is a malformed tag payload inside an otherwise
/// well-framed container. The two stay separate so callers can distinguish
/// "not the container it claimed to be" from "container fine, tags broken".
#[derive(Debug, Error)]
pub enum TagError {
    #[error("malformed container: {0}")]
    Format(String),

    #[error("malformed tag data: {0}")]
    Parse(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl TagError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
