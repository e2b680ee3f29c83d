#![forbid(unsafe_code)]

//! Fixed-encoding string decoders.
//!
//! Tag payloads embed strings in a handful of encodings. Each decoder
//! returns the decoded text together with the count of source bytes it
//! consumed (including a terminator when one was found), so parsers can
//! advance their offset precisely.

use encoding_rs::{UTF_8, UTF_16BE, UTF_16LE};

/// Encodings a source can decode through
/// [`string_at`](crate::MediaSource::string_at).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// One byte per character, mapped straight to U+0000..U+00FF.
    Latin1,
    /// UTF-8, honoring a leading BOM.
    Utf8,
    /// UTF-16; a leading BOM selects the byte order, big-endian otherwise.
    Utf16,
}

/// A decoded string plus the number of source bytes consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub bytes_read: usize,
}

/// Decode `bytes` with the given encoding, stopping at the first NUL.
#[must_use]
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> DecodedText {
    match encoding {
        TextEncoding::Latin1 => nul_terminated(bytes),
        TextEncoding::Utf8 => utf8(bytes),
        TextEncoding::Utf16 => utf16(bytes, true),
    }
}

/// Decode UTF-8, skipping a leading BOM and stopping at the first NUL byte.
#[must_use]
pub fn utf8(bytes: &[u8]) -> DecodedText {
    let start = if bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        3
    } else {
        0
    };

    let rest = &bytes[start..];
    let (end, consumed) = match rest.iter().position(|&b| b == 0x00) {
        Some(nul) => (nul, nul + 1),
        None => (rest.len(), rest.len()),
    };

    let (text, _, _) = UTF_8.decode(&rest[..end]);
    DecodedText {
        text: text.into_owned(),
        bytes_read: start + consumed,
    }
}

/// Decode UTF-16, selecting byte order from a BOM when present and falling
/// back to `big_endian` otherwise. Stops at the first NUL code unit.
#[must_use]
pub fn utf16(bytes: &[u8], big_endian: bool) -> DecodedText {
    let (big_endian, start) = match bytes {
        [0xfe, 0xff, ..] => (true, 2),
        [0xff, 0xfe, ..] => (false, 2),
        _ => (big_endian, 0),
    };

    // Find the terminating NUL code unit; surrogate halves can never be
    // 0x0000, so a unit-wise scan is safe.
    let rest = &bytes[start..];
    let mut end = 0;
    while end + 2 <= rest.len() && (rest[end] != 0x00 || rest[end + 1] != 0x00) {
        end += 2;
    }
    let consumed = if end + 2 <= rest.len() { end + 2 } else { end };

    let encoding = if big_endian { UTF_16BE } else { UTF_16LE };
    let (text, _, _) = encoding.decode(&rest[..end]);
    DecodedText {
        text: text.into_owned(),
        bytes_read: start + consumed,
    }
}

/// Decode a NUL-terminated Latin-1 string.
#[must_use]
pub fn nul_terminated(bytes: &[u8]) -> DecodedText {
    let (end, consumed) = match bytes.iter().position(|&b| b == 0x00) {
        Some(nul) => (nul, nul + 1),
        None => (bytes.len(), bytes.len()),
    };

    let text = bytes[..end].iter().map(|&b| char::from(b)).collect();
    DecodedText {
        text,
        bytes_read: consumed,
    }
}
