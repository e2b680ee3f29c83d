#![forbid(unsafe_code)]

//! Self-coalescing chunk buffer.
//!
//! [`ChunkStore`] keeps the bytes fetched so far as a sorted list of
//! non-overlapping, non-adjacent [`Chunk`]s. Inserting a range that touches
//! or overlaps existing chunks replaces the whole touched group with one
//! merged chunk, so back-to-back sequential fetches never fragment the store.

use crate::error::{StorageError, StorageResult};

/// A contiguous stored byte span with a known file offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    offset: u64,
    data: Vec<u8>,
}

impl Chunk {
    /// File offset of the first byte.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of stored bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exclusive end offset (`offset + len`).
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Result of scanning for chunks touched by a new range.
enum ChunkScan {
    /// No touched chunks; insert a new chunk at this index to keep the list
    /// sorted. The index is tracked as a side effect of the overlap scan.
    Insert(usize),
    /// Inclusive index range of the touched group.
    Group { first: usize, last: usize },
}

/// Sparse, self-coalescing buffer of byte chunks keyed by file offset.
///
/// Grows monotonically; never shrinks. The chunk list stays sorted by
/// offset with no two chunks overlapping or touching. Lookups are linear in
/// the chunk count, which coalescing keeps small under the sequential-ish
/// access patterns of container parsing.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
}

impl ChunkStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { chunks: Vec::new() }
    }

    /// Number of distinct chunks currently held.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterate stored chunks in offset order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    /// Insert `data` at `offset`, merging with every chunk the new range
    /// overlaps or sits within one byte of.
    ///
    /// When the new range collides with existing chunks only partially, the
    /// non-overlapping prefix of the first touched chunk and suffix of the
    /// last touched chunk are carried over, and the single merged chunk
    /// replaces the whole group.
    pub fn add_data(&mut self, offset: u64, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let end = offset + data.len() as u64 - 1;

        match self.scan_range(offset, end) {
            ChunkScan::Insert(ix) => {
                self.chunks.insert(
                    ix,
                    Chunk {
                        offset,
                        data: data.to_vec(),
                    },
                );
            }
            ChunkScan::Group { first, last } => {
                let first_chunk = &self.chunks[first];
                let last_chunk = &self.chunks[last];
                let needs_prepend = offset > first_chunk.offset;
                let needs_append = end < last_chunk.end() - 1;

                let merged_offset = offset.min(first_chunk.offset);
                let mut merged = if needs_prepend {
                    let prefix_len = (offset - first_chunk.offset) as usize;
                    let mut buf =
                        first_chunk.data[..prefix_len.min(first_chunk.data.len())].to_vec();
                    buf.extend_from_slice(data);
                    buf
                } else {
                    data.to_vec()
                };
                if needs_append {
                    merged.truncate((last_chunk.offset - merged_offset) as usize);
                    merged.extend_from_slice(&last_chunk.data);
                }

                self.chunks.splice(
                    first..=last,
                    std::iter::once(Chunk {
                        offset: merged_offset,
                        data: merged,
                    }),
                );
            }
        }
    }

    /// Whether one stored chunk fully contains the inclusive range
    /// `[start, end]`.
    ///
    /// Bytes that happen to be present across two not-yet-merged chunks do
    /// not count; only `add_data` merges.
    #[must_use]
    pub fn has_range(&self, start: u64, end: u64) -> bool {
        for chunk in &self.chunks {
            if end < chunk.offset {
                return false;
            }
            if start >= chunk.offset && end < chunk.end() {
                return true;
            }
        }
        false
    }

    /// Read the byte at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotLoaded`] when no chunk contains the offset.
    pub fn byte_at(&self, offset: u64) -> StorageResult<u8> {
        for chunk in &self.chunks {
            if offset >= chunk.offset && offset < chunk.end() {
                return Ok(chunk.data[(offset - chunk.offset) as usize]);
            }
        }
        Err(StorageError::NotLoaded { offset })
    }

    /// Find the chunks the inclusive range `[start, end]` overlaps, counting
    /// a chunk as touched when it is within one byte of the range.
    ///
    /// The insertion index for the no-group case is the position at which
    /// the scan stopped, advanced only after fully passing a chunk.
    fn scan_range(&self, start: u64, end: u64) -> ChunkScan {
        let mut insert_ix = 0;
        let mut group_first = None;

        for (i, chunk) in self.chunks.iter().enumerate() {
            if end + 1 < chunk.offset {
                // The range ends before this chunk; nothing later can touch.
                break;
            }
            if start <= chunk.end() + 1 && end + 1 >= chunk.offset {
                group_first = Some(i);
                break;
            }
            insert_ix = i + 1;
        }

        let Some(first) = group_first else {
            return ChunkScan::Insert(insert_ix);
        };

        let mut last = first;
        for (i, chunk) in self.chunks.iter().enumerate().skip(first) {
            if end + 1 >= chunk.offset {
                last = i;
            }
            if end <= chunk.end() + 1 {
                break;
            }
        }

        ChunkScan::Group { first, last }
    }
}
