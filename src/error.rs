use std::io;
use thiserror::Error;

/// Every way a decode can fail.  All causes abort the decode in progress;
/// no partial tree is ever handed back.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Missing 'rtfd' magic")]
    MissingMagic,
    #[error("Unexpected reserved header value: {0:#010x}")]
    UnexpectedReservedValue(u32),
    #[error("Unexpected root record type: {0} (expected 3)")]
    UnexpectedRootType(u32),
    #[error("Truncated header")]
    TruncatedHeader,
    #[error("Truncated string")]
    TruncatedString,
    #[error("Truncated length table")]
    TruncatedLengthTable,
    #[error("Truncated record count")]
    TruncatedRecordCount,
    #[error("Truncated record type")]
    TruncatedRecordType,
    #[error("Unknown record type: {0}")]
    UnknownRecordType(u32),
    #[error("Directory nesting exceeds {0} levels")]
    DepthLimitExceeded(usize),
    #[error("String of {len} bytes exceeds limit of {limit} bytes")]
    StringTooLong { len: u64, limit: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FormatError {
    /// True for the causes produced by running out of input.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            FormatError::TruncatedHeader
                | FormatError::TruncatedString
                | FormatError::TruncatedLengthTable
                | FormatError::TruncatedRecordCount
                | FormatError::TruncatedRecordType
        )
    }
}

/// Map an I/O failure to `cause` when it is an early EOF, otherwise keep it
/// as a genuine I/O error.
pub(crate) fn eof_as(err: io::Error, cause: FormatError) -> FormatError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        cause
    } else {
        FormatError::Io(err)
    }
}
