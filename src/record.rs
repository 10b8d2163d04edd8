use crate::codec::TextEncoding;
use crate::error::{EncodeError, ParseError};
use std::any::Any;
use std::fmt;

/// Wire tag identifying a record's concrete kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct RecordTag(pub u16);

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl From<u16> for RecordTag {
    fn from(v: u16) -> Self {
        RecordTag(v)
    }
}

// PlayReady object record types
pub const RM_HEADER: RecordTag = RecordTag(0x0001);
pub const RESERVED: RecordTag = RecordTag(0x0002);
pub const EMBEDDED_LICENSE_STORE: RecordTag = RecordTag(0x0003);

/// Read-only view of a record's content, for display and JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// A type-tagged record that can parse and serialize its own payload.
///
/// Implementations receive exactly the bytes the container declared for
/// them and must report their size only through [`Record::serialize`].
pub trait Record: fmt::Debug + Send + Sync + Any {
    fn tag(&self) -> RecordTag;

    /// Short human-readable kind, used in logs and dumps.
    fn name(&self) -> &'static str;

    /// Populate fields from `payload`. Reading less than all of it is allowed.
    fn parse(&mut self, payload: &[u8]) -> Result<(), ParseError>;

    /// Encode current field values. The length of the result is the
    /// record's length on the wire.
    fn serialize(&self) -> Result<Vec<u8>, EncodeError>;

    /// Length this record was parsed from, if it came off the wire.
    fn raw_len(&self) -> Option<usize> {
        None
    }

    fn value(&self) -> RecordValue;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Text stored in a fixed encoding, re-encoded verbatim on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRecord {
    tag: RecordTag,
    encoding: TextEncoding,
    text: String,
    raw_len: Option<usize>,
}

impl TextRecord {
    pub fn new(tag: RecordTag, encoding: TextEncoding) -> Self {
        Self {
            tag,
            encoding,
            text: String::new(),
            raw_len: None,
        }
    }

    pub fn with_text(tag: RecordTag, encoding: TextEncoding, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(tag, encoding)
        }
    }

    /// PlayReady rights management header (UTF-16LE XML).
    pub fn rm_header(xml: impl Into<String>) -> Self {
        Self::with_text(RM_HEADER, TextEncoding::Utf16Le, xml)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }
}

impl Record for TextRecord {
    fn tag(&self) -> RecordTag {
        self.tag
    }

    fn name(&self) -> &'static str {
        if self.tag == RM_HEADER {
            "RMHeader"
        } else {
            "Text"
        }
    }

    fn parse(&mut self, payload: &[u8]) -> Result<(), ParseError> {
        self.text = self
            .encoding
            .decode(payload)
            .map_err(|e| ParseError::malformed(self.tag, e))?;
        self.raw_len = Some(payload.len());
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        self.encoding
            .encode(&self.text)
            .map_err(|e| EncodeError::InvalidField {
                tag: self.tag,
                reason: e.to_string(),
            })
    }

    fn raw_len(&self) -> Option<usize> {
        self.raw_len
    }

    fn value(&self) -> RecordValue {
        RecordValue::Text(self.text.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Opaque payload kept as-is, for records a caller deliberately leaves
/// uninterpreted (e.g. the embedded license store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRecord {
    tag: RecordTag,
    data: Vec<u8>,
    raw_len: Option<usize>,
}

impl BlobRecord {
    pub fn new(tag: RecordTag) -> Self {
        Self {
            tag,
            data: Vec::new(),
            raw_len: None,
        }
    }

    pub fn with_data(tag: RecordTag, data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::new(tag)
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }
}

impl Record for BlobRecord {
    fn tag(&self) -> RecordTag {
        self.tag
    }

    fn name(&self) -> &'static str {
        match self.tag {
            EMBEDDED_LICENSE_STORE => "EmbeddedLicenseStore",
            RESERVED => "Reserved",
            _ => "Blob",
        }
    }

    fn parse(&mut self, payload: &[u8]) -> Result<(), ParseError> {
        self.data = payload.to_vec();
        self.raw_len = Some(payload.len());
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.data.clone())
    }

    fn raw_len(&self) -> Option<usize> {
        self.raw_len
    }

    fn value(&self) -> RecordValue {
        RecordValue::Bytes(self.data.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Record for a tag with no registered factory. Payload bytes pass through
/// untouched so unknown or vendor records survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecord {
    tag: RecordTag,
    data: Vec<u8>,
    raw_len: Option<usize>,
}

impl UnknownRecord {
    pub fn new(tag: RecordTag) -> Self {
        Self {
            tag,
            data: Vec::new(),
            raw_len: None,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Record for UnknownRecord {
    fn tag(&self) -> RecordTag {
        self.tag
    }

    fn name(&self) -> &'static str {
        "Unknown"
    }

    fn parse(&mut self, payload: &[u8]) -> Result<(), ParseError> {
        self.data = payload.to_vec();
        self.raw_len = Some(payload.len());
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.data.clone())
    }

    fn raw_len(&self) -> Option<usize> {
        self.raw_len
    }

    fn value(&self) -> RecordValue {
        RecordValue::Bytes(self.data.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
