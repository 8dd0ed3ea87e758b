use byteorder::{ByteOrder, LittleEndian};
use std::io::Read;

use crate::error::{eof_as, FormatError};

pub const MAGIC: &[u8; 4] = b"rtfd";
pub const HEADER_SIZE: usize = 12;
/// The only root record type a bundle may declare: a directory.
pub const ROOT_TYPE_DIRECTORY: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub magic:     [u8; 4],
    pub reserved:  u32,
    pub root_type: u32,
}

impl Header {
    /// Read and validate the 12-byte preamble.  On success exactly
    /// `HEADER_SIZE` bytes have been consumed.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, FormatError> {
        let mut buf = [0u8; HEADER_SIZE];
        reader
            .read_exact(&mut buf)
            .map_err(|e| eof_as(e, FormatError::TruncatedHeader))?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[..4]);
        if &magic != MAGIC {
            return Err(FormatError::MissingMagic);
        }
        let reserved = LittleEndian::read_u32(&buf[4..8]);
        if reserved != 0 {
            return Err(FormatError::UnexpectedReservedValue(reserved));
        }
        let root_type = LittleEndian::read_u32(&buf[8..12]);
        if root_type != ROOT_TYPE_DIRECTORY {
            return Err(FormatError::UnexpectedRootType(root_type));
        }
        Ok(Self { magic, reserved, root_type })
    }
}

pub fn read_header<R: Read>(reader: R) -> Result<Header, FormatError> {
    Header::read(reader)
}
