use crate::{
    container::{Container, RECORD_OVERHEAD},
    error::EncodeError,
    pssh::{BoxForm, ProtectionData, PsshBox},
    record::{RecordTag, RecordValue},
    registry::{Registry, playready_registry},
};
use serde::Serialize;
use std::{fs, path::Path};

/// A JSON-serializable representation of a single record.
///
/// This is designed for tooling output, e.g. `psshdump --json`.
#[derive(Debug, Serialize)]
pub struct JsonRecord {
    pub index: usize,
    pub tag: RecordTag,
    pub name: String,
    pub length: usize,               // payload bytes as they would be written now
    pub raw_length: Option<usize>,   // payload bytes on the wire, if parsed
    pub text: Option<String>,
    pub hex: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonContainer {
    pub length: usize,
    pub parsed_length: Option<u32>,
    pub record_count: usize,
    pub records: Vec<JsonRecord>,
}

#[derive(Debug, Serialize)]
pub struct JsonPssh {
    pub form: BoxForm,
    pub size: usize,
    pub version: u8,
    pub flags: u32,
    pub system_id: String,
    pub system_name: Option<String>,
    pub key_ids: Vec<String>,
    pub playready: Option<JsonContainer>,
    pub data_hex: Option<String>,
}

impl TryFrom<&Container> for JsonContainer {
    type Error = EncodeError;

    fn try_from(c: &Container) -> Result<Self, Self::Error> {
        let mut length = crate::container::CONTAINER_OVERHEAD;
        let mut records = Vec::with_capacity(c.len());
        for (index, record) in c.records().iter().enumerate() {
            let payload_len = record.serialize()?.len();
            length += RECORD_OVERHEAD + payload_len;
            let (text, hex) = match record.value() {
                RecordValue::Text(s) => (Some(s), None),
                RecordValue::Bytes(b) => (None, Some(hex::encode(b))),
            };
            records.push(JsonRecord {
                index,
                tag: record.tag(),
                name: record.name().to_string(),
                length: payload_len,
                raw_length: record.raw_len(),
                text,
                hex,
            });
        }
        Ok(JsonContainer {
            length,
            parsed_length: c.parsed_length(),
            record_count: records.len(),
            records,
        })
    }
}

impl TryFrom<&PsshBox> for JsonPssh {
    type Error = EncodeError;

    fn try_from(b: &PsshBox) -> Result<Self, Self::Error> {
        let (playready, data_hex) = match &b.data {
            ProtectionData::PlayReady(c) => (Some(JsonContainer::try_from(c)?), None),
            ProtectionData::Opaque(d) => (None, Some(hex::encode(d))),
        };
        Ok(JsonPssh {
            form: b.form,
            size: b.serialize()?.len(),
            version: b.version,
            flags: b.flags,
            system_id: b.system_id.to_string(),
            system_name: b.system_id.known_name().map(str::to_string),
            key_ids: b.key_ids.iter().map(|k| k.to_string()).collect(),
            playready,
            data_hex,
        })
    }
}

/// Synchronous analysis function: parse a bare PlayReady object from a file
/// using the default PlayReady registry.
pub fn analyze_container_file(path: impl AsRef<Path>) -> anyhow::Result<JsonContainer> {
    let bytes = fs::read(path)?;
    let container = Container::parse(&bytes, &playready_registry())?;
    Ok(JsonContainer::try_from(&container)?)
}

/// Parse a `pssh` (or PIFF `uuid`) box from a file.
pub fn analyze_pssh_file(path: impl AsRef<Path>, registry: &Registry) -> anyhow::Result<JsonPssh> {
    let bytes = fs::read(path)?;
    let pssh = PsshBox::parse(&bytes, registry)?;
    Ok(JsonPssh::try_from(&pssh)?)
}
