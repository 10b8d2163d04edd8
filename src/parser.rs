use crate::boxes::{BoxHeader, FourCC, Guid, UUID};
use crate::codec::{ByteReader, ByteWriter};
use crate::error::{ParseError, Result};

pub fn read_box_header(r: &mut ByteReader<'_>) -> Result<BoxHeader> {
    let size32 = r.read_u32()?;
    let typ = FourCC(r.read_array::<4>()?);
    let mut size = size32 as u64;

    if size32 == 1 {
        size = r.read_u64()?;
    }

    let mut uuid = None;
    if typ == UUID {
        uuid = Some(Guid(r.read_array::<16>()?));
    }

    let header_size = match (size32 == 1, uuid.is_some()) {
        (true, true)  => 8 + 8 + 16,
        (true, false) => 8 + 8,
        (false, true) => 8 + 16,
        (false, false)=> 8,
    } as u64;

    if size != 0 && size < header_size {
        return Err(ParseError::InvalidBoxSize { size, header_size });
    }

    Ok(BoxHeader { size, typ, uuid, header_size, large_size: size32 == 1 })
}

/// Write a box header for a payload of `payload_len` bytes.
///
/// The 64-bit size form is used when requested or when the box does not
/// fit in 32 bits.
pub fn write_box_header(
    w: &mut ByteWriter,
    typ: FourCC,
    uuid: Option<Guid>,
    payload_len: u64,
    large_size: bool,
) {
    let uuid_len = if uuid.is_some() { 16 } else { 0 };
    let small = 8 + uuid_len + payload_len;
    let large = large_size || small > u32::MAX as u64;

    if large {
        w.write_u32(1);
        w.write_bytes(&typ.0);
        w.write_u64(small + 8);
    } else {
        w.write_u32(small as u32);
        w.write_bytes(&typ.0);
    }
    if let Some(u) = uuid {
        w.write_bytes(&u.0);
    }
}
