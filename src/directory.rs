//! Directory records.
//!
//! ```text
//! Directory := count:u32,
//!              keys[count]:String,
//!              lengthTable[count]:u32,
//!              records[count]: (type:u32, payload)
//! ```
//!
//! A type-1 payload is a string (file content), a type-3 payload is another
//! directory record.  Nested directories are decoded with an explicit stack
//! of half-built records rather than by recursion, and the nesting depth is
//! capped by [`DecodeOptions::max_depth`].

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::io::Read;
use tracing::{debug, trace};

use crate::error::{eof_as, FormatError};
use crate::node::{Child, DirectoryNode, FileNode, Node};
use crate::string::read_blob;

/// Metadata key holding the ASCII preferred name.
pub const PREFERRED_NAME_KEY: &str = "__@PreferredName@__";
/// Metadata key holding the UTF-8 preferred name.  Wins over the ASCII one.
pub const UTF8_PREFERRED_NAME_KEY: &str = "__@UTF8PreferredName@__";
/// Placeholder entry; never content.
pub const PLACEHOLDER_KEY: &str = ".";
/// Sole key of a directory that wraps a single file.
pub const SINGLE_FILE_KEY: &str = "..";

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Records this many keys or fewer get their vectors reserved up front.
const PREALLOC_RECORDS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RecordType {
    File      = 1,
    Directory = 3,
}

impl TryFrom<u32> for RecordType {
    type Error = FormatError;

    fn try_from(v: u32) -> Result<Self, FormatError> {
        match v {
            1 => Ok(RecordType::File),
            3 => Ok(RecordType::Directory),
            other => Err(FormatError::UnknownRecordType(other)),
        }
    }
}

/// Resource ceilings applied while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum directory nesting, counting the root as depth 1.  Zero
    /// rejects every bundle.
    pub max_depth:      usize,
    /// Longest string body accepted, if any.
    pub max_string_len: Option<u64>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth:      DEFAULT_MAX_DEPTH,
            max_string_len: None,
        }
    }
}

/// Decode one directory record with default options.
pub fn read_directory<R: Read>(reader: R) -> Result<Node, FormatError> {
    read_directory_with(reader, &DecodeOptions::default())
}

/// Decode one directory record and everything nested inside it.
///
/// Any failure aborts the whole decode; half-built records are dropped.
pub fn read_directory_with<R: Read>(mut reader: R, opts: &DecodeOptions) -> Result<Node, FormatError> {
    if opts.max_depth == 0 {
        return Err(FormatError::DepthLimitExceeded(0));
    }
    let mut parents: Vec<PendingDirectory> = Vec::new();
    let mut current = PendingDirectory::read(&mut reader, opts)?;

    loop {
        if current.is_complete() {
            let node = current.finish();
            match parents.pop() {
                Some(parent) => {
                    current = parent;
                    current.values.push(node);
                    continue;
                }
                None => return Ok(node),
            }
        }

        let raw_type = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| eof_as(e, FormatError::TruncatedRecordType))?;

        match RecordType::try_from(raw_type)? {
            RecordType::File => {
                let blob = read_blob(&mut reader, opts.max_string_len)?;
                trace!(len = blob.bytes.len(), pad = blob.pad_len, "file record");
                current.values.push(Node::File(FileNode {
                    name:    String::new(),
                    content: blob.into(),
                }));
            }
            RecordType::Directory => {
                // current sits at depth parents.len() + 1.
                if parents.len() + 2 > opts.max_depth {
                    return Err(FormatError::DepthLimitExceeded(opts.max_depth));
                }
                let child = PendingDirectory::read(&mut reader, opts)?;
                parents.push(std::mem::replace(&mut current, child));
            }
        }
    }
}

/// A directory whose keys are known but whose values are still arriving.
struct PendingDirectory {
    /// Raw key bytes; distinct keys stay distinct even when neither is UTF-8.
    keys:   Vec<Vec<u8>>,
    values: Vec<Node>,
}

impl PendingDirectory {
    /// Consume the count, keys and length table of one record.
    fn read<R: Read>(reader: &mut R, opts: &DecodeOptions) -> Result<Self, FormatError> {
        let count = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| eof_as(e, FormatError::TruncatedRecordCount))? as usize;
        let reserve = count.min(PREALLOC_RECORDS);

        let mut keys = Vec::with_capacity(reserve);
        for _ in 0..count {
            let key = read_blob(&mut *reader, opts.max_string_len)?;
            keys.push(key.bytes);
        }

        // The length table is consumed to stay aligned but never trusted.
        for key in &keys {
            let hint = reader
                .read_u32::<LittleEndian>()
                .map_err(|e| eof_as(e, FormatError::TruncatedLengthTable))?;
            trace!(key = %String::from_utf8_lossy(key), hint, "length table entry");
        }

        debug!(count, "directory record");
        Ok(Self { keys, values: Vec::with_capacity(reserve) })
    }

    fn is_complete(&self) -> bool {
        self.values.len() == self.keys.len()
    }

    /// Pair keys with values, split off metadata and apply the single-file
    /// collapse.
    fn finish(self) -> Node {
        // Later duplicates replace the value but keep the first position.
        let mut entries: IndexMap<Vec<u8>, Node> = IndexMap::with_capacity(self.keys.len());
        for (key, value) in self.keys.into_iter().zip(self.values) {
            entries.insert(key, value);
        }

        let mut ascii_name = String::new();
        let mut utf8_name = String::new();
        let mut children = Vec::with_capacity(entries.len());
        for (key, node) in entries {
            match key.as_slice() {
                k if k == PREFERRED_NAME_KEY.as_bytes()      => ascii_name = node_text(node),
                k if k == UTF8_PREFERRED_NAME_KEY.as_bytes() => utf8_name = node_text(node),
                k if k == PLACEHOLDER_KEY.as_bytes()         => {}
                _ => children.push(Child {
                    key: String::from_utf8_lossy(&key).into_owned(),
                    node,
                }),
            }
        }

        let name = if !utf8_name.is_empty() { utf8_name } else { ascii_name };

        let single_file = matches!(
            children.as_slice(),
            [Child { key, node: Node::File(_) }] if key == SINGLE_FILE_KEY
        );
        if single_file {
            if let Some(Child { node: Node::File(file), .. }) = children.pop() {
                debug!(name = %name, len = file.content.data.len(), "single-file wrapper");
                return Node::File(FileNode { name, content: file.content });
            }
        }

        Node::Directory(DirectoryNode { name, children })
    }
}

/// Text of a metadata value; a directory where a name was expected reads
/// as no name.
fn node_text(node: Node) -> String {
    match node {
        Node::File(file) => String::from_utf8_lossy(&file.content.data).into_owned(),
        Node::Directory(_) => String::new(),
    }
}
