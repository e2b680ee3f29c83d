#![forbid(unsafe_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    error::SourceResult,
    text::{self, TextEncoding},
};

/// What a caller hands to a read request: either a URL for a range-capable
/// backend or an already resident byte buffer.
#[derive(Debug, Clone)]
pub enum ReadTarget {
    Url(Url),
    Memory(Bytes),
}

impl From<Url> for ReadTarget {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<Bytes> for ReadTarget {
    fn from(bytes: Bytes) -> Self {
        Self::Memory(bytes)
    }
}

impl From<Vec<u8>> for ReadTarget {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Memory(Bytes::from(bytes))
    }
}

/// An asynchronous, range-loadable, byte-addressable view of one file.
///
/// The lifecycle is: `init` once (resolves the size), then any number of
/// `load_range` calls, each of which makes the covered bytes readable
/// through the synchronous accessors. Loads within one parse run are
/// strictly sequential; the only suspension points a source introduces are
/// `init` and `load_range` themselves.
///
/// A source is created per read request and dropped with it.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Resolve the file size.
    ///
    /// # Errors
    ///
    /// Fails with a transport error when the size cannot be determined.
    async fn init(&self) -> SourceResult<()>;

    /// Make the inclusive byte range readable.
    ///
    /// After success every offset in `range ∩ [0, size)` is retrievable
    /// synchronously. Implementations must short-circuit without a
    /// transport call when the range is already resident, and may batch
    /// small reads by rounding the end up to a fixed granularity — but
    /// never past `size - 1`. On failure no partial data is exposed.
    async fn load_range(&self, range: (u64, u64)) -> SourceResult<()>;

    /// Read one loaded byte.
    fn byte_at(&self, offset: u64) -> SourceResult<u8>;

    /// Read `length` loaded bytes starting at `offset`.
    ///
    /// Assembled byte-by-byte, so a read may span stored chunks that happen
    /// to sit adjacent without having been merged.
    fn bytes_at(&self, offset: u64, length: usize) -> SourceResult<Vec<u8>> {
        let mut out = Vec::with_capacity(length);
        for i in 0..length as u64 {
            out.push(self.byte_at(offset + i)?);
        }
        Ok(out)
    }

    /// Decode `length` loaded bytes at `offset` as a string.
    fn string_at(&self, offset: u64, length: usize, encoding: TextEncoding) -> SourceResult<String> {
        let bytes = self.bytes_at(offset, length)?;
        Ok(text::decode(&bytes, encoding).text)
    }

    /// Total size in bytes. Valid only once `init` has resolved.
    fn len(&self) -> SourceResult<u64>;
}

/// Constructs a [`MediaSource`] for targets a backend recognizes.
///
/// Factories live in the process-wide registry; `can_open` is the
/// registration-ordered predicate the orchestrator consults when the caller
/// did not pick a backend explicitly.
pub trait SourceFactory: Send + Sync {
    /// Backend name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this backend can handle the target.
    fn can_open(&self, target: &ReadTarget) -> bool;

    /// Open the target.
    ///
    /// # Errors
    ///
    /// Fails with [`SourceError::UnsupportedTarget`](crate::SourceError)
    /// when handed a target `can_open` would reject.
    fn open(&self, target: &ReadTarget) -> SourceResult<Arc<dyn MediaSource>>;
}
