//! The decoded file-wrapper tree.

use crate::flatten::Flatten;
use crate::string::StringBlob;

/// Raw bytes of one file, with the padding length they were stored behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContent {
    pub data:    Vec<u8>,
    pub pad_len: u32,
}

impl From<StringBlob> for FileContent {
    fn from(blob: StringBlob) -> Self {
        Self { data: blob.bytes, pad_len: blob.pad_len }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNode {
    /// Resolved preferred name.  Empty for plain type-1 records, which are
    /// named by their key alone.
    pub name:    String,
    pub content: FileContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    pub name:     String,
    /// Content children in first-seen decode order.
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub key:  String,
    pub node: Node,
}

impl Child {
    /// The path segment this child contributes when flattened: its resolved
    /// name when it has one, its storage key otherwise.
    pub fn segment(&self) -> &str {
        match self.node.name() {
            "" => &self.key,
            name => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::File(f)      => &f.name,
            Node::Directory(d) => &d.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            Node::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(d) => Some(d),
            Node::File(_) => None,
        }
    }

    /// Number of file leaves below (and including) this node.
    pub fn file_count(&self) -> usize {
        self.flatten("").count()
    }

    /// Sum of all leaf content lengths.
    pub fn total_size(&self) -> u64 {
        self.flatten("").map(|e| e.data.len() as u64).sum()
    }

    /// Lazily walk the leaves of this tree; see [`crate::flatten::flatten`].
    pub fn flatten<'a>(&'a self, base_path: &str) -> Flatten<'a> {
        crate::flatten::flatten(self, base_path)
    }
}
