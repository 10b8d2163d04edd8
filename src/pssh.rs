//! Protection system specific header box.
//!
//! Both the ISO CENC `pssh` box and the older PIFF `uuid` form are
//! understood. When the system ID is PlayReady the payload is decoded as a
//! [`Container`]; any other system's payload stays opaque.

use crate::boxes::{Guid, PIFF_PSSH_USERTYPE, PLAYREADY_SYSTEM_ID, PSSH, UUID};
use crate::codec::{ByteReader, ByteWriter};
use crate::container::Container;
use crate::error::{EncodeError, ParseError, Result};
use crate::parser::{read_box_header, write_box_header};
use crate::registry::Registry;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BoxForm {
    /// ISO/IEC 23001-7 `pssh` box.
    Pssh,
    /// PIFF 1.1 `uuid` box; never carries key IDs.
    Piff,
}

#[derive(Debug)]
pub enum ProtectionData {
    PlayReady(Container),
    Opaque(Vec<u8>),
}

#[derive(Debug)]
pub struct PsshBox {
    pub form: BoxForm,
    pub version: u8,
    pub flags: u32,
    pub system_id: Guid,
    /// Only written for `pssh` boxes with version 1 or above.
    pub key_ids: Vec<Guid>,
    /// Keep the 64-bit size field on write.
    pub large_size: bool,
    pub data: ProtectionData,
}

impl PsshBox {
    /// Version 0 `pssh` box wrapping a PlayReady object.
    pub fn playready(container: Container) -> Self {
        Self {
            form: BoxForm::Pssh,
            version: 0,
            flags: 0,
            system_id: PLAYREADY_SYSTEM_ID,
            key_ids: Vec::new(),
            large_size: false,
            data: ProtectionData::PlayReady(container),
        }
    }

    pub fn opaque(system_id: Guid, data: impl Into<Vec<u8>>) -> Self {
        Self {
            form: BoxForm::Pssh,
            version: 0,
            flags: 0,
            system_id,
            key_ids: Vec::new(),
            large_size: false,
            data: ProtectionData::Opaque(data.into()),
        }
    }

    /// Attach key IDs, bumping the box to version 1.
    pub fn with_key_ids(mut self, key_ids: Vec<Guid>) -> Self {
        self.version = self.version.max(1);
        self.key_ids = key_ids;
        self
    }

    pub fn container(&self) -> Option<&Container> {
        match &self.data {
            ProtectionData::PlayReady(c) => Some(c),
            ProtectionData::Opaque(_) => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.data {
            ProtectionData::PlayReady(c) => Some(c),
            ProtectionData::Opaque(_) => None,
        }
    }

    fn has_key_ids(&self) -> bool {
        self.form == BoxForm::Pssh && self.version > 0
    }

    /// Parse a complete box from the start of `bytes`.
    pub fn parse(bytes: &[u8], registry: &Registry) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let hdr = read_box_header(&mut r)?;
        let form = match (hdr.typ, hdr.uuid) {
            (PSSH, _) => BoxForm::Pssh,
            (UUID, Some(PIFF_PSSH_USERTYPE)) => BoxForm::Piff,
            _ => {
                return Err(ParseError::UnexpectedBoxType {
                    expected: PSSH,
                    found: hdr.typ,
                });
            }
        };

        let available = bytes.len() as u64;
        let size = if hdr.size == 0 { available } else { hdr.size };
        if size > available {
            return Err(ParseError::TruncatedBox {
                needed: size,
                available,
            });
        }

        let mut r = ByteReader::new(&bytes[hdr.header_size as usize..size as usize]);
        let version = r.read_u8()?;
        let flags = r.read_u24()?;
        let system_id = Guid(r.read_array::<16>()?);

        let mut key_ids = Vec::new();
        if form == BoxForm::Pssh && version > 0 {
            let kid_count = r.read_u32()?;
            let needed = kid_count as u64 * 16;
            if needed > r.remaining() as u64 {
                return Err(ParseError::TruncatedBox {
                    needed,
                    available: r.remaining() as u64,
                });
            }
            for _ in 0..kid_count {
                key_ids.push(Guid(r.read_array::<16>()?));
            }
        }

        let data_size = r.read_u32()?;
        if data_size as usize > r.remaining() {
            return Err(ParseError::TruncatedBox {
                needed: data_size as u64,
                available: r.remaining() as u64,
            });
        }
        let payload = r.read_bytes(data_size as usize)?;
        if !r.is_empty() {
            return Err(ParseError::TrailingBytes(r.remaining()));
        }

        debug!(?form, version, %system_id, kids = key_ids.len(), data_size, "parsed pssh box");

        let data = if system_id == PLAYREADY_SYSTEM_ID {
            let (container, used) = Container::parse_prefix(payload, registry)?;
            if used != payload.len() {
                return Err(ParseError::TrailingBytes(payload.len() - used));
            }
            ProtectionData::PlayReady(container)
        } else {
            ProtectionData::Opaque(payload.to_vec())
        };

        Ok(Self {
            form,
            version,
            flags,
            system_id,
            key_ids,
            large_size: hdr.large_size,
            data,
        })
    }

    /// Offset of the first protection data byte within [`PsshBox::serialize`]
    /// output.
    pub fn data_offset(&self) -> std::result::Result<usize, EncodeError> {
        let data = self.encode_data()?;
        let fixed = self.fixed_body_len();
        Ok(self.header_len((fixed + data.len()) as u64) as usize + fixed)
    }

    /// Encode the box. Box size and data size are recomputed.
    pub fn serialize(&self) -> std::result::Result<Vec<u8>, EncodeError> {
        let data = self.encode_data()?;
        let data_size = data_size_field(data.len())?;

        let body_len = self.fixed_body_len() + data.len();
        let (typ, uuid) = match self.form {
            BoxForm::Pssh => (PSSH, None),
            BoxForm::Piff => (UUID, Some(PIFF_PSSH_USERTYPE)),
        };

        let mut w = ByteWriter::with_capacity(body_len + 32);
        write_box_header(&mut w, typ, uuid, body_len as u64, self.large_size);
        w.write_u8(self.version);
        w.write_u24(self.flags);
        w.write_bytes(&self.system_id.0);
        if self.has_key_ids() {
            w.write_u32(self.key_ids.len() as u32);
            for kid in &self.key_ids {
                w.write_bytes(&kid.0);
            }
        }
        w.write_u32(data_size);
        w.write_bytes(&data);
        Ok(w.into_inner())
    }

    fn encode_data(&self) -> std::result::Result<Vec<u8>, EncodeError> {
        match &self.data {
            ProtectionData::PlayReady(c) => c.serialize(),
            ProtectionData::Opaque(b) => Ok(b.clone()),
        }
    }

    // version/flags, system ID, key IDs and the data size field
    fn fixed_body_len(&self) -> usize {
        let kid_len = if self.has_key_ids() {
            4 + 16 * self.key_ids.len()
        } else {
            0
        };
        4 + 16 + kid_len + 4
    }

    // Mirrors the size selection in `write_box_header`.
    fn header_len(&self, body_len: u64) -> u64 {
        let uuid_len = if self.form == BoxForm::Piff { 16 } else { 0 };
        if self.large_size || 8 + uuid_len + body_len > u32::MAX as u64 {
            16 + uuid_len
        } else {
            8 + uuid_len
        }
    }
}

fn data_size_field(len: usize) -> std::result::Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::DataTooLarge(len))
}
