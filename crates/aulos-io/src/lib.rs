#![forbid(unsafe_code)]

//! `aulos-io`
//!
//! The random-access source contract parsers read through.
//!
//! A [`MediaSource`] is one opened file: ranges are loaded asynchronously
//! with [`MediaSource::load_range`], then read synchronously from whatever
//! has been fetched so far. Two backends ship here: [`HttpSource`] (HTTP
//! range requests into a sparse [`aulos_storage::ChunkStore`]) and
//! [`MemSource`] (a fully resident byte slice). Further backends only need
//! to satisfy the same trait.

mod error;
mod http;
mod memory;
mod source;
pub mod text;

pub use error::{SourceError, SourceResult};
pub use http::{HttpSource, HttpSourceFactory};
pub use memory::{MemSource, MemSourceFactory};
pub use source::{MediaSource, ReadTarget, SourceFactory};
pub use text::{DecodedText, TextEncoding};
