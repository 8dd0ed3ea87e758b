//! High-level [`RtfdArchive`] API — the primary embedding surface.
//!
//! ```no_run
//! use rtfd::archive::{Parsed, RtfdArchive};
//!
//! let mut ar = RtfdArchive::open_path("bundle.bin")?;
//! if ar.is_valid() {
//!     for entry in ar.parse_entries()? {
//!         println!("{} ({} bytes)", entry.path, entry.data.len());
//!     }
//! }
//! match ar.parse(false)? {
//!     Parsed::Tree(root) => println!("{} file(s)", root.file_count()),
//!     Parsed::Entries(_) => unreachable!(),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::directory::{read_directory_with, DecodeOptions};
use crate::error::FormatError;
use crate::flatten::FlattenedEntry;
use crate::header::Header;
use crate::node::Node;
use crate::recovery::{self, LegacyBlock};

/// Result of [`RtfdArchive::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Tree(Node),
    Entries(Vec<FlattenedEntry<'static>>),
}

/// A parser bound to one seekable byte source.
///
/// The offset the source was at when opened is remembered, and every parse
/// starts from there, so one handle can be parsed any number of times.
pub struct RtfdArchive<R: Read + Seek> {
    reader:  R,
    start:   u64,
    options: DecodeOptions,
}

impl RtfdArchive<BufReader<File>> {
    /// Open a bundle stored in a file.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let file = File::open(path)?;
        Self::open(BufReader::new(file))
    }
}

impl RtfdArchive<Cursor<Vec<u8>>> {
    /// Parse a bundle already held in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            reader:  Cursor::new(bytes.into()),
            start:   0,
            options: DecodeOptions::default(),
        }
    }
}

impl<R: Read + Seek> RtfdArchive<R> {
    /// Bind to `reader` at its current position.
    pub fn open(mut reader: R) -> Result<Self, FormatError> {
        let start = reader.stream_position()?;
        Ok(Self { reader, start, options: DecodeOptions::default() })
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Check the preamble without disturbing the source.  The cursor is put
    /// back where it was whatever the outcome.
    pub fn is_valid(&mut self) -> bool {
        let Ok(pos) = self.reader.stream_position() else {
            return false;
        };
        let valid = self
            .reader
            .seek(SeekFrom::Start(self.start))
            .map_err(FormatError::from)
            .and_then(|_| Header::read(&mut self.reader))
            .is_ok();
        let restored = self.reader.seek(SeekFrom::Start(pos)).is_ok();
        valid && restored
    }

    /// Decode the whole bundle.  With `flatten` set the tree is walked into
    /// `(path, bytes)` entries before being returned.
    pub fn parse(&mut self, flatten: bool) -> Result<Parsed, FormatError> {
        let root = self.parse_tree()?;
        if flatten {
            Ok(Parsed::Entries(owned_entries(&root)))
        } else {
            Ok(Parsed::Tree(root))
        }
    }

    /// Decode the whole bundle into its tree.
    pub fn parse_tree(&mut self) -> Result<Node, FormatError> {
        self.reader.seek(SeekFrom::Start(self.start))?;
        let header = Header::read(&mut self.reader)?;
        debug!(root_type = header.root_type, "header ok");
        read_directory_with(&mut self.reader, &self.options)
    }

    /// Decode the whole bundle into flattened entries.
    pub fn parse_entries(&mut self) -> Result<Vec<FlattenedEntry<'static>>, FormatError> {
        let root = self.parse_tree()?;
        Ok(owned_entries(&root))
    }

    /// Alternate strategy: recover single-file wrappers by searching for the
    /// metadata marker instead of decoding records.  See
    /// [`crate::recovery::scanner`].
    pub fn scan_markers(&mut self) -> Result<Vec<LegacyBlock>, FormatError> {
        self.reader.seek(SeekFrom::Start(self.start))?;
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(recovery::scan(&data))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn owned_entries(root: &Node) -> Vec<FlattenedEntry<'static>> {
    root.flatten("").map(FlattenedEntry::into_owned).collect()
}
