//! Length-prefixed byte strings.
//!
//! ```text
//! String := length:u32
//!           if length == 0x80000000:
//!              trueLength:u32, paddingLength:u32, pad[paddingLength], body[trueLength]
//!           else:
//!              body[length]
//! ```
//!
//! The sentinel form exists because the serializer aligns some bodies; the
//! pad bytes are skipped without being interpreted.  All integers are
//! little-endian.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::error::{eof_as, FormatError};

/// Length value announcing the extended (true length + padding) form.
pub const SENTINEL_LENGTH: u32 = 0x8000_0000;

/// Upper bound on the up-front allocation for a body.  Longer bodies grow as
/// bytes actually arrive, so a lying length cannot reserve gigabytes.
const PREALLOC_LIMIT: u64 = 64 * 1024;

/// One decoded string together with the padding it was stored behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBlob {
    pub bytes:   Vec<u8>,
    pub pad_len: u32,
}

impl StringBlob {
    pub fn was_padded(&self) -> bool {
        self.pad_len > 0
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Decode one string and return its body only.
pub fn read_string<R: Read>(reader: R) -> Result<Vec<u8>, FormatError> {
    read_blob(reader, None).map(|blob| blob.bytes)
}

/// Decode one string.  With `limit` set, a body longer than the limit is
/// rejected before any of it is read.
pub fn read_blob<R: Read>(mut reader: R, limit: Option<u64>) -> Result<StringBlob, FormatError> {
    let length = reader
        .read_u32::<LittleEndian>()
        .map_err(|e| eof_as(e, FormatError::TruncatedString))?;

    let (body_len, pad_len) = if length == SENTINEL_LENGTH {
        let true_len = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| eof_as(e, FormatError::TruncatedLengthTable))?;
        let pad_len = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| eof_as(e, FormatError::TruncatedLengthTable))?;
        (true_len, pad_len)
    } else {
        (length, 0)
    };

    if let Some(limit) = limit {
        if u64::from(body_len) > limit {
            return Err(FormatError::StringTooLong { len: u64::from(body_len), limit });
        }
    }

    if pad_len > 0 {
        let skipped = io::copy(&mut (&mut reader).take(u64::from(pad_len)), &mut io::sink())?;
        if skipped != u64::from(pad_len) {
            return Err(FormatError::TruncatedString);
        }
    }

    let bytes = read_body(&mut reader, u64::from(body_len))?;
    Ok(StringBlob { bytes, pad_len })
}

fn read_body<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>, FormatError> {
    let mut body = Vec::with_capacity(len.min(PREALLOC_LIMIT) as usize);
    reader.take(len).read_to_end(&mut body)?;
    if body.len() as u64 != len {
        return Err(FormatError::TruncatedString);
    }
    Ok(body)
}
