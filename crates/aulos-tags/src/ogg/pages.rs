#![forbid(unsafe_code)]

//! Page-level packet reassembly.
//!
//! A page is a 27-byte header, a segment table of up to 255 length bytes,
//! then the payload. Each table entry describes one 0–255 byte frame
//! segment: 255 means the current packet continues (possibly into the next
//! page), anything smaller terminates it. The last entry of a table always
//! closes the pending segment run because the page payload ends there, even
//! when the packet itself continues on the next page.

use aulos_io::MediaSource;
use tracing::trace;

use crate::error::{TagError, TagResult};

use super::PAGE_MAGIC;

/// Fixed page header length; byte 26 is the segment-table entry count.
const PAGE_HEADER_LEN: u64 = 27;

/// Reassemble the first `want` logical packets of an Ogg stream.
///
/// Loads are lazy and strictly sequential: the header, then the table, then
/// each completed segment run, never reading ahead of what the current
/// parse step needs. Returns as soon as `want` packets are complete;
/// whatever follows (audio data) is never requested.
pub(crate) async fn collect_packets(
    source: &dyn MediaSource,
    want: usize,
) -> TagResult<Vec<Vec<u8>>> {
    let mut offset: u64 = 0;
    let mut packets: Vec<Vec<u8>> = Vec::new();
    // Whether the next segment run starts a new packet (true at stream
    // start, and again after any run terminated by a segment < 255).
    let mut fresh_packet = true;

    loop {
        source
            .load_range((offset, offset + PAGE_HEADER_LEN - 1))
            .await?;
        let magic = source.bytes_at(offset, PAGE_MAGIC.len())?;
        if magic != PAGE_MAGIC {
            return Err(TagError::format(format!(
                "bad page capture pattern at offset {offset}"
            )));
        }
        let segment_count = source.byte_at(offset + 26)?;
        offset += PAGE_HEADER_LEN;

        if segment_count > 0 {
            source
                .load_range((offset, offset + u64::from(segment_count) - 1))
                .await?;
        }
        let table = source.bytes_at(offset, segment_count as usize)?;
        offset += u64::from(segment_count);

        trace!(page_offset = offset, segment_count, "walking segment table");

        // Length of the segment run currently accumulating in this page.
        let mut run_len: u64 = 0;
        for (i, &segment) in table.iter().enumerate() {
            if fresh_packet {
                packets.push(Vec::new());
                fresh_packet = false;
                run_len = 0;
            }
            run_len += u64::from(segment);

            // A segment < 255 ends the packet; the last table entry ends
            // the run either way because the page payload stops here.
            if segment < 255 || i == table.len() - 1 {
                if run_len > 0 {
                    source.load_range((offset, offset + run_len - 1)).await?;
                    let data = source.bytes_at(offset, run_len as usize)?;
                    offset += run_len;
                    packets
                        .last_mut()
                        .expect("run implies an open packet")
                        .extend_from_slice(&data);
                }
                fresh_packet = segment < 255;
                if fresh_packet && packets.len() >= want {
                    return Ok(packets);
                }
                run_len = 0;
            }
        }
    }
}
