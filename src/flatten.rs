//! Walk a decoded tree into `(path, bytes)` leaves.
//!
//! Each child contributes one path segment (its resolved name, else its key).
//! The root directory's own name is not prepended: it names the bundle that
//! the caller's `base_path` already stands for.  Segments are joined with
//! `/`.
//!
//! The walk borrows the tree and keeps its own stack, so the same tree can be
//! flattened any number of times with identical results.

use std::borrow::Cow;
use std::slice;

use crate::node::{Child, FileContent, Node};

/// One leaf of a flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedEntry<'a> {
    pub path:    String,
    pub data:    Cow<'a, [u8]>,
    pub pad_len: u32,
}

impl<'a> FlattenedEntry<'a> {
    fn borrowed(path: String, content: &'a FileContent) -> Self {
        Self { path, data: Cow::Borrowed(&content.data), pad_len: content.pad_len }
    }

    pub fn into_owned(self) -> FlattenedEntry<'static> {
        FlattenedEntry {
            path:    self.path,
            data:    Cow::Owned(self.data.into_owned()),
            pad_len: self.pad_len,
        }
    }
}

/// Lazy depth-first iterator returned by [`flatten`].
pub struct Flatten<'a> {
    root_file: Option<FlattenedEntry<'a>>,
    stack:     Vec<(String, slice::Iter<'a, Child>)>,
}

pub fn flatten<'a>(node: &'a Node, base_path: &str) -> Flatten<'a> {
    match node {
        Node::File(file) => Flatten {
            root_file: Some(FlattenedEntry::borrowed(join(base_path, &file.name), &file.content)),
            stack:     Vec::new(),
        },
        Node::Directory(dir) => Flatten {
            root_file: None,
            stack:     vec![(base_path.to_string(), dir.children.iter())],
        },
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlattenedEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.root_file.take() {
            return Some(entry);
        }
        loop {
            let (prefix, children) = self.stack.last_mut()?;
            let Some(child) = children.next() else {
                self.stack.pop();
                continue;
            };
            let path = join(prefix, child.segment());
            match &child.node {
                Node::File(file) => return Some(FlattenedEntry::borrowed(path, &file.content)),
                Node::Directory(dir) => self.stack.push((path, dir.children.iter())),
            }
        }
    }
}

fn join(base: &str, segment: &str) -> String {
    match (base.is_empty(), segment.is_empty()) {
        (true, _)      => segment.to_string(),
        (false, true)  => base.to_string(),
        (false, false) => format!("{base}/{segment}"),
    }
}
