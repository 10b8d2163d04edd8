//! Length- and count-prefixed record container (the PlayReady object layout).
//!
//! ```text
//! length:u32 | count:u16 | { tag:u16 | len:u16 | payload[len] } * count
//! ```

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{EncodeError, ParseError, Result};
use crate::record::{Record, RecordTag};
use crate::registry::Registry;
use tracing::{debug, trace, warn};

/// Bytes taken by the container's own length and count fields.
pub const CONTAINER_OVERHEAD: usize = 4 + 2;
/// Bytes taken by each record's tag and length fields.
pub const RECORD_OVERHEAD: usize = 2 + 2;

/// An ordered sequence of records. Order is preserved on serialization.
#[derive(Debug, Default)]
pub struct Container {
    records: Vec<Box<dyn Record>>,
    parsed_length: Option<u32>,
    // bytes the parsed records actually occupied, header included
    parsed_extent: Option<usize>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Box<dyn Record>>) -> Self {
        Self {
            records,
            parsed_length: None,
            parsed_extent: None,
        }
    }

    /// Parse a container from the start of `bytes`.
    ///
    /// The declared length is only checked against the size of `bytes`;
    /// records are bounded by the buffer. Bytes after the last record are
    /// ignored. Nothing is returned unless every record parsed.
    pub fn parse(bytes: &[u8], registry: &Registry) -> Result<Self> {
        Self::parse_prefix(bytes, registry).map(|(c, _)| c)
    }

    /// Like [`Container::parse`], also returning how many bytes the header
    /// and records occupied.
    pub fn parse_prefix(bytes: &[u8], registry: &Registry) -> Result<(Self, usize)> {
        let res = parse_container(bytes, registry);
        if let Err(e) = &res {
            warn!(error = %e, available = bytes.len(), "container rejected");
        }
        res
    }

    /// Replace `self` with the container parsed from `bytes`. On error `self`
    /// is left untouched.
    pub fn reparse(&mut self, bytes: &[u8], registry: &Registry) -> Result<()> {
        *self = Self::parse(bytes, registry)?;
        Ok(())
    }

    /// Length field read off the wire, if this container was parsed.
    pub fn parsed_length(&self) -> Option<u32> {
        self.parsed_length
    }

    pub fn records(&self) -> &[Box<dyn Record>] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Box<dyn Record>] {
        &mut self.records
    }

    pub fn push(&mut self, record: impl Record) {
        self.records.push(Box::new(record));
    }

    pub fn push_boxed(&mut self, record: Box<dyn Record>) {
        self.records.push(record);
    }

    pub fn insert(&mut self, index: usize, record: Box<dyn Record>) {
        self.records.insert(index, record);
    }

    pub fn remove(&mut self, index: usize) -> Box<dyn Record> {
        self.records.remove(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Downcast the record at `index` to a concrete variant.
    pub fn get<T: Record>(&self, index: usize) -> Option<&T> {
        self.records.get(index)?.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Record>(&mut self, index: usize) -> Option<&mut T> {
        self.records.get_mut(index)?.as_any_mut().downcast_mut::<T>()
    }

    /// First record carrying `tag`.
    pub fn find(&self, tag: RecordTag) -> Option<&dyn Record> {
        self.records
            .iter()
            .find(|r| r.tag() == tag)
            .map(|r| &**r)
    }

    /// Serialized size computed from current field values:
    /// `6 + Σ(4 + payload_len)`.
    pub fn encoded_len(&self) -> std::result::Result<usize, EncodeError> {
        let payloads = self.encode_payloads()?;
        Ok(total_len(&payloads))
    }

    /// Encode the container. Record lengths are always recomputed from the
    /// records' current state.
    ///
    /// The length field is recomputed too, except that a parsed container
    /// whose records still occupy exactly the bytes they were parsed from
    /// writes its wire length back verbatim, even if that value was not
    /// `6 + Σ(4 + payload_len)`.
    pub fn serialize(&self) -> std::result::Result<Vec<u8>, EncodeError> {
        let payloads = self.encode_payloads()?;
        let total = total_len(&payloads);
        let length = match (self.parsed_length, self.parsed_extent) {
            (Some(declared), Some(extent)) if extent == total => declared,
            _ => length_field(total as u64)?,
        };

        let mut w = ByteWriter::with_capacity(total);
        w.write_u32(length);
        w.write_u16(self.records.len() as u16);
        for (record, payload) in self.records.iter().zip(&payloads) {
            w.write_u16(record.tag().0);
            w.write_u16(payload.len() as u16);
            w.write_bytes(payload);
        }
        debug!(length, count = self.records.len(), "serialized container");
        Ok(w.into_inner())
    }

    // Serialize every record once; bounds are checked here so the writer
    // can cast lengths freely.
    fn encode_payloads(&self) -> std::result::Result<Vec<Vec<u8>>, EncodeError> {
        if self.records.len() > u16::MAX as usize {
            return Err(EncodeError::TooManyRecords(self.records.len()));
        }
        self.records
            .iter()
            .map(|record| {
                let payload = record.serialize()?;
                if payload.len() > u16::MAX as usize {
                    return Err(EncodeError::RecordTooLarge {
                        tag: record.tag(),
                        len: payload.len(),
                    });
                }
                Ok(payload)
            })
            .collect()
    }
}

fn total_len(payloads: &[Vec<u8>]) -> usize {
    CONTAINER_OVERHEAD
        + payloads
            .iter()
            .map(|p| RECORD_OVERHEAD + p.len())
            .sum::<usize>()
}

fn length_field(total: u64) -> std::result::Result<u32, EncodeError> {
    u32::try_from(total).map_err(|_| EncodeError::ContainerTooLarge(total))
}

fn parse_container(bytes: &[u8], registry: &Registry) -> Result<(Container, usize)> {
    let mut r = ByteReader::new(bytes);
    let declared = r.read_u32()?;
    if declared as usize > bytes.len() {
        return Err(ParseError::TruncatedContainer {
            declared,
            available: bytes.len(),
        });
    }
    let count = r.read_u16()?;
    debug!(declared, count, "parsing container");

    let mut records = Vec::with_capacity((count as usize).min(r.remaining() / RECORD_OVERHEAD));
    for index in 0..count {
        let tag = RecordTag(r.read_u16()?);
        let length = r.read_u16()?;
        let remaining = r.remaining();
        if length as usize > remaining {
            return Err(ParseError::RecordLengthOverflow {
                tag,
                length,
                remaining,
            });
        }

        // The record sees exactly its own bytes; the cursor moves past all of
        // them whatever the record chose to read.
        let payload = r.read_bytes(length as usize)?;
        let mut record = registry.create(tag);
        trace!(index, %tag, length, kind = record.name(), "parsing record");
        record.parse(payload)?;
        records.push(record);
    }

    let consumed = r.position();
    if consumed != declared as usize {
        debug!(declared, consumed, "declared length differs from record extent");
    }

    Ok((
        Container {
            records,
            parsed_length: Some(declared),
            parsed_extent: Some(consumed),
        },
        consumed,
    ))
}
