use crate::boxes::FourCC;
use crate::record::RecordTag;

/// Failure to decode or encode a fixed-width text field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("utf-16 payload has odd length {0}")]
    OddLength(usize),
    #[error("unpaired utf-16 surrogate 0x{0:04x}")]
    UnpairedSurrogate(u16),
    #[error("non-ascii byte 0x{byte:02x} at offset {offset}")]
    NonAscii { byte: u8, offset: usize },
    #[error("non-ascii character {0:?}")]
    NonAsciiChar(char),
    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEndOfInput { needed: usize, available: usize },
    #[error("truncated container: declared {declared} bytes, {available} available")]
    TruncatedContainer { declared: u32, available: usize },
    #[error("record {tag} declares {length} bytes but only {remaining} remain in the buffer")]
    RecordLengthOverflow {
        tag: RecordTag,
        length: u16,
        remaining: usize,
    },
    #[error("invalid text: {0}")]
    InvalidText(#[from] TextError),
    #[error("malformed record {tag}: {reason}")]
    MalformedRecord { tag: RecordTag, reason: String },
    #[error("invalid box size {size} (header is {header_size} bytes)")]
    InvalidBoxSize { size: u64, header_size: u64 },
    #[error("expected '{expected}' box, found '{found}'")]
    UnexpectedBoxType { expected: FourCC, found: FourCC },
    #[error("truncated box: needs {needed} bytes, {available} available")]
    TruncatedBox { needed: u64, available: u64 },
    #[error("{0} unused bytes after the last field")]
    TrailingBytes(usize),
}

impl ParseError {
    /// Wrap a variant-specific complaint about a record payload.
    pub fn malformed(tag: RecordTag, reason: impl std::fmt::Display) -> Self {
        ParseError::MalformedRecord {
            tag,
            reason: reason.to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("record {tag} payload is {len} bytes, limit is 65535")]
    RecordTooLarge { tag: RecordTag, len: usize },
    #[error("container holds {0} records, limit is 65535")]
    TooManyRecords(usize),
    #[error("container would be {0} bytes, limit is 4294967295")]
    ContainerTooLarge(u64),
    #[error("pssh data is {0} bytes, limit is 4294967295")]
    DataTooLarge(usize),
    #[error("record {tag} cannot encode its field: {reason}")]
    InvalidField { tag: RecordTag, reason: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;
