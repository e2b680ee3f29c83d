#![forbid(unsafe_code)]

//! `aulos-storage`
//!
//! Sparse storage primitives for aulos.
//!
//! Provides [`ChunkStore`], an incremental byte buffer that accumulates
//! ranges of a remote file as they are fetched and coalesces overlapping or
//! adjacent ranges into single chunks. Readers can then ask whether a range
//! is fully resident and read individual bytes synchronously.

mod chunks;
mod error;

pub use chunks::{Chunk, ChunkStore};
pub use error::{StorageError, StorageResult};
