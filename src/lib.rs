pub mod error;
pub mod header;
pub mod string;
pub mod node;
pub mod directory;
pub mod flatten;
pub mod archive;
pub mod recovery;
pub mod report;

pub use error::FormatError;
pub use header::{Header, read_header};
pub use string::{StringBlob, read_string, read_blob};
pub use node::{Child, DirectoryNode, FileContent, FileNode, Node};
pub use directory::{DecodeOptions, read_directory, read_directory_with};
pub use flatten::{FlattenedEntry, flatten};
pub use archive::{Parsed, RtfdArchive};
