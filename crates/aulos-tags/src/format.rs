#![forbid(unsafe_code)]

use async_trait::async_trait;
use aulos_io::MediaSource;

use crate::{error::TagResult, types::Tags};

/// Byte range of a format's identification probe.
///
/// A negative offset counts from the end of the file, so `{-128, 128}` is
/// "the last 128 bytes". For a negative offset `offset + length` must not
/// be positive, or the range reaches past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentRange {
    pub offset: i64,
    pub length: usize,
}

impl IdentRange {
    #[must_use]
    pub fn new(offset: i64, length: usize) -> Self {
        Self { offset, length }
    }

    /// Whether the range fits a file of `size` bytes.
    ///
    /// Ranges that do not fit are never an error; the format simply cannot
    /// match that file and is skipped.
    #[must_use]
    pub fn is_valid_for(&self, size: u64) -> bool {
        let invalid_positive = self.offset >= 0
            && self.offset as u64 + self.length as u64 >= size;
        let invalid_negative = self.offset < 0
            && (self.offset.unsigned_abs() > size || self.offset + self.length as i64 > 0);
        !(invalid_positive || invalid_negative)
    }

    /// Absolute start offset in a file of `size` bytes.
    ///
    /// Call only on ranges that passed [`is_valid_for`](Self::is_valid_for).
    #[must_use]
    pub fn resolve(&self, size: u64) -> u64 {
        if self.offset >= 0 {
            self.offset as u64
        } else {
            size - self.offset.unsigned_abs()
        }
    }
}

/// One readable tag format: a cheap identification probe plus a parser.
///
/// `ident_range` and `matches` drive detection — the orchestrator loads the
/// probe bytes and asks every registered format in registration order.
/// `read` then parses the matched file, driving further range loads against
/// the same source as its parse state advances.
#[async_trait]
pub trait TagFormat: Send + Sync {
    /// Format name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Where the identification bytes live.
    fn ident_range(&self) -> IdentRange;

    /// Whether the bytes at [`ident_range`](Self::ident_range) belong to
    /// this format.
    fn matches(&self, ident: &[u8]) -> bool;

    /// Parse the tags.
    ///
    /// `wanted` restricts the output to the named canonical tags; `None`
    /// keeps everything the format can decode.
    async fn read(
        &self,
        source: &dyn MediaSource,
        wanted: Option<&[String]>,
    ) -> TagResult<Tags>;
}
