#![forbid(unsafe_code)]

//! Vorbis/Opus comment block decoding.
//!
//! Both codecs carry the same comment structure, differing only in the
//! signature that precedes it: `0x03 "vorbis"` for Vorbis, `"OpusTags"` for
//! Opus. Comments are `KEY=value` pairs; a handful of well-known keys map
//! onto canonical tag names and `METADATA_BLOCK_PICTURE` carries a base64
//! FLAC picture block.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::{
    error::{TagError, TagResult},
    types::{Picture, Tags},
};

/// Picture-type labels indexed by the picture block's type code.
const PICTURE_TYPES: [&str; 21] = [
    "Other",
    "32x32 pixels 'file icon' (PNG only)",
    "Other file icon",
    "Cover (front)",
    "Cover (back)",
    "Leaflet page",
    "Media (e.g. label side of CD)",
    "Lead artist/lead performer/soloist",
    "Artist/performer",
    "Conductor",
    "Band/Orchestra",
    "Composer",
    "Lyricist/text writer",
    "Recording Location",
    "During recording",
    "During performance",
    "Movie/video screen capture",
    "A bright coloured fish",
    "Illustration",
    "Band/artist logotype",
    "Publisher/Studio logotype",
];

/// Decode the comment header packet (packet 2 of the stream).
pub(crate) fn decode_comment_packet(
    packet: &[u8],
    wanted: Option<&[String]>,
) -> TagResult<Tags> {
    let (format, mut offset) = if packet.first() == Some(&0x03)
        && packet.get(1..7) == Some(b"vorbis".as_slice())
    {
        ("Vorbis", 7)
    } else if packet.get(..8) == Some(b"OpusTags".as_slice()) {
        ("Opus", 8)
    } else {
        return Err(TagError::parse("unrecognized comment packet signature"));
    };

    let mut tags = Tags::new(format);

    let vendor_length = le_u32(packet, offset)? as usize;
    offset += 4 + vendor_length; // vendor string itself is discarded

    let comment_count = le_u32(packet, offset)?;
    offset += 4;

    for _ in 0..comment_count {
        let length = le_u32(packet, offset)? as usize;
        offset += 4;
        let raw = slice(packet, offset, length)?;
        offset += length;

        let entry = String::from_utf8_lossy(raw);
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };

        match key.to_uppercase().as_str() {
            key @ ("TITLE" | "ARTIST" | "ALBUM" | "GENRE") => {
                insert_text(&mut tags, wanted, key.to_lowercase(), value);
            }
            "DATE" => insert_text(&mut tags, wanted, "year", value),
            "TRACKNUMBER" => insert_text(&mut tags, wanted, "track", value),
            "METADATA_BLOCK_PICTURE" => {
                if requested(wanted, "picture") {
                    tags.insert_picture("picture", decode_picture(value)?);
                }
            }
            _ => {}
        }
    }

    Ok(tags)
}

fn requested(wanted: Option<&[String]>, key: &str) -> bool {
    wanted.is_none_or(|names| names.iter().any(|n| n == key))
}

fn insert_text(tags: &mut Tags, wanted: Option<&[String]>, key: impl Into<String>, value: &str) {
    let key = key.into();
    if requested(wanted, &key) {
        tags.insert_text(key, value);
    }
}

/// Decode a `METADATA_BLOCK_PICTURE` value: base64 around a FLAC picture
/// block (all integers big-endian).
fn decode_picture(value: &str) -> TagResult<Picture> {
    let raw = BASE64
        .decode(value)
        .map_err(|e| TagError::parse(format!("picture block is not valid base64: {e}")))?;

    let mut offset = 0;
    let type_code = be_u32(&raw, offset)? as usize;
    offset += 4;

    let mime_length = be_u32(&raw, offset)? as usize;
    offset += 4;
    let format = latin1(slice(&raw, offset, mime_length)?);
    offset += mime_length;

    let description_length = be_u32(&raw, offset)? as usize;
    offset += 4;
    let description = latin1(slice(&raw, offset, description_length)?);
    offset += description_length;

    // Width, height, color depth, indexed-color count: parsed past, not
    // surfaced.
    offset += 16;

    let data_length = be_u32(&raw, offset)? as usize;
    offset += 4;
    let data = slice(&raw, offset, data_length)?.to_vec();

    Ok(Picture {
        format,
        kind: PICTURE_TYPES
            .get(type_code)
            .copied()
            .unwrap_or(PICTURE_TYPES[0])
            .to_string(),
        description,
        data,
    })
}

fn slice(bytes: &[u8], offset: usize, length: usize) -> TagResult<&[u8]> {
    bytes
        .get(offset..offset + length)
        .ok_or_else(|| TagError::parse("comment packet ended unexpectedly"))
}

fn le_u32(bytes: &[u8], offset: usize) -> TagResult<u32> {
    let raw: [u8; 4] = slice(bytes, offset, 4)?
        .try_into()
        .expect("slice of length 4");
    Ok(u32::from_le_bytes(raw))
}

fn be_u32(bytes: &[u8], offset: usize) -> TagResult<u32> {
    let raw: [u8; 4] = slice(bytes, offset, 4)?
        .try_into()
        .expect("slice of length 4");
    Ok(u32::from_be_bytes(raw))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
