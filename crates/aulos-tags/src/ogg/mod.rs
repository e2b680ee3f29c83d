#![forbid(unsafe_code)]

//! Ogg container tag reader.
//!
//! An Ogg stream interleaves logical packets across physical pages. The
//! first packet is the codec identification header and the second holds the
//! Vorbis/Opus comment block, so the reader reassembles exactly two packets
//! — requesting only the bytes each framing step needs — and decodes the
//! comment block out of the second. Audio pages are never touched.

mod comment;
mod pages;

use async_trait::async_trait;
use aulos_io::MediaSource;
use tracing::debug;

use crate::{
    error::TagResult,
    format::{IdentRange, TagFormat},
    types::Tags,
};

/// Capture pattern every Ogg page starts with.
pub const PAGE_MAGIC: &[u8; 4] = b"OggS";

/// [`TagFormat`] for Ogg-contained Vorbis and Opus streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct OggFormat;

#[async_trait]
impl TagFormat for OggFormat {
    fn name(&self) -> &'static str {
        "ogg"
    }

    fn ident_range(&self) -> IdentRange {
        IdentRange::new(0, 4)
    }

    fn matches(&self, ident: &[u8]) -> bool {
        ident.get(..4) == Some(PAGE_MAGIC.as_slice())
    }

    async fn read(
        &self,
        source: &dyn MediaSource,
        wanted: Option<&[String]>,
    ) -> TagResult<Tags> {
        let packets = pages::collect_packets(source, 2).await?;
        debug!(
            ident_len = packets[0].len(),
            comment_len = packets[1].len(),
            "reassembled header packets"
        );
        comment::decode_comment_packet(&packets[1], wanted)
    }
}
