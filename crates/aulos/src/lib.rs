#![forbid(unsafe_code)]

//! # Aulos
//!
//! Read embedded metadata (title, artist, album, cover art, …) out of media
//! files without downloading them: parsers request only the byte ranges
//! they need, so a tag read against a large remote file costs a handful of
//! small HTTP range requests.
//!
//! ## Quick start
//!
//! ```ignore
//! use aulos::prelude::*;
//!
//! let url = url::Url::parse("https://example.com/track.ogg")?;
//! let tags = aulos::read(url).await?;
//! println!("{:?}", tags.text("title"));
//! ```
//!
//! ## Configuration
//!
//! Backends and tag formats live in a [`Registry`]; build one at startup,
//! then hand it to each [`Reader`]:
//!
//! ```ignore
//! let mut registry = Registry::with_defaults();
//! registry.add_tag_reader(Arc::new(MyFormat));
//!
//! let tags = Reader::new(url)
//!     .with_registry(Arc::new(registry))
//!     .tags_to_read(["title", "picture"])
//!     .read()
//!     .await?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod io {
    pub use aulos_io::*;
}

pub mod net {
    pub use aulos_net::*;
}

pub mod storage {
    pub use aulos_storage::*;
}

pub mod tags {
    pub use aulos_tags::*;
}

// ── Reader ──────────────────────────────────────────────────────────────

mod error;
mod reader;
mod registry;

pub use aulos_io::ReadTarget;
pub use aulos_tags::{Picture, TagMap, TagValue, Tags};
pub use error::ReadError;
pub use reader::Reader;
pub use registry::Registry;

/// Read tags from a target with the default registry.
///
/// # Errors
///
/// See [`ReadError`] for the failure kinds.
pub async fn read(target: impl Into<ReadTarget>) -> Result<Tags, ReadError> {
    Reader::new(target).read().await
}

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use aulos_io::{MediaSource, ReadTarget, SourceFactory, TextEncoding};
    pub use aulos_tags::{IdentRange, Picture, TagFormat, TagValue, Tags};

    pub use crate::{ReadError, Reader, Registry};
}
