//! Marker scanner — recover single-file wrappers without decoding structure.
//!
//! # How it works
//!
//! Every single-file wrapper written by the serializer lists its metadata
//! keys back to back: the length-prefixed `__@PreferredName@__` immediately
//! followed by the length-prefixed `__@UTF8PreferredName@__`.  That run of
//! bytes ([`COMBINED_MARKER`]) is searched for in the raw buffer, and the
//! file body is read at fixed offsets after it:
//!
//! | Field | Size |
//! |-------|------|
//! | combined marker | 50 B |
//! | skipped (`.` key + four length-table entries) | 21 B |
//! | record type, must be `01 00 00 00` | 4 B |
//! | length, or `00 00 00 80` then length + pad length | 4 or 12 B |
//! | padding | pad length |
//! | file body | length |
//! | ASCII name: `01 00 00 00`, length, bytes | 8 B + length |
//! | UTF-8 name: `01 00 00 00`, length, bytes | 8 B + length |
//!
//! Nothing around the marker is validated, so this works on bundles whose
//! directory records are damaged, but it can also be fooled by file content
//! that happens to contain the marker.  Scanning stops at the first block
//! that does not parse.

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use crate::flatten::FlattenedEntry;
use crate::header::MAGIC;

/// Length-prefixed `__@PreferredName@__` followed by length-prefixed
/// `__@UTF8PreferredName@__`.
pub const COMBINED_MARKER: &[u8] = b"\x13\x00\x00\x00__@PreferredName@__\x17\x00\x00\x00__@UTF8PreferredName@__";

/// Bytes between the marker and the file record's type field.
const SKIP_AFTER_MARKER: usize = 21;

const FILE_RECORD: [u8; 4] = [0x01, 0x00, 0x00, 0x00];
const SENTINEL: [u8; 4] = [0x00, 0x00, 0x00, 0x80];

/// One file recovered by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyBlock {
    /// Offset of the combined marker in the scanned buffer.
    pub offset:     usize,
    pub file_data:  Vec<u8>,
    pub pad_len:    u32,
    pub ascii_name: String,
    pub utf8_name:  String,
}

impl LegacyBlock {
    /// UTF-8 name if non-empty, else the ASCII name, else nothing.
    pub fn display_name(&self) -> Option<&str> {
        [&self.utf8_name, &self.ascii_name]
            .into_iter()
            .find(|n| !n.is_empty())
            .map(String::as_str)
    }
}

impl From<LegacyBlock> for FlattenedEntry<'static> {
    fn from(block: LegacyBlock) -> Self {
        let path = block.display_name().unwrap_or_default().to_string();
        FlattenedEntry {
            path,
            data:    block.file_data.into(),
            pad_len: block.pad_len,
        }
    }
}

/// Scan `data` for marker-delimited file blocks.
///
/// A buffer that does not start with the `rtfd` magic yields no blocks.
pub fn scan(data: &[u8]) -> Vec<LegacyBlock> {
    let mut blocks = Vec::new();
    if !data.starts_with(MAGIC) {
        debug!("no 'rtfd' magic at start; nothing to scan");
        return blocks;
    }

    let mut offset = MAGIC.len();
    while let Some(pos) = find(data, COMBINED_MARKER, offset) {
        match parse_block(data, pos) {
            Some((block, next)) => {
                debug!(offset = pos, len = block.file_data.len(), pad = block.pad_len, "recovered block");
                blocks.push(block);
                offset = next;
            }
            None => {
                debug!(offset = pos, "block failed to parse; stopping");
                break;
            }
        }
    }
    blocks
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Bounds-checked forward reader over a byte slice.
struct Bytes<'a> {
    data: &'a [u8],
    pos:  usize,
}

impl<'a> Bytes<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let out = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(out)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }

    fn literal(&mut self, tag: &[u8]) -> Option<()> {
        (self.take(tag.len())? == tag).then_some(())
    }

    /// `01 00 00 00`, length, bytes.
    fn name(&mut self) -> Option<String> {
        self.literal(&FILE_RECORD)?;
        let len = self.u32()? as usize;
        Some(String::from_utf8_lossy(self.take(len)?).into_owned())
    }
}

fn parse_block(data: &[u8], start: usize) -> Option<(LegacyBlock, usize)> {
    let mut bytes = Bytes { data, pos: start };
    bytes.literal(COMBINED_MARKER)?;
    bytes.take(SKIP_AFTER_MARKER)?;
    bytes.literal(&FILE_RECORD)?;

    let length = bytes.take(4)?;
    let (file_len, pad_len) = if length == SENTINEL {
        (bytes.u32()?, bytes.u32()?)
    } else {
        (LittleEndian::read_u32(length), 0)
    };
    bytes.take(pad_len as usize)?;
    let file_data = bytes.take(file_len as usize)?.to_vec();

    let ascii_name = bytes.name()?;
    let utf8_name = bytes.name()?;

    let block = LegacyBlock { offset: start, file_data, pad_len, ascii_name, utf8_name };
    Some((block, bytes.pos))
}
