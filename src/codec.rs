//! Big-endian primitive reads and writes over in-memory buffers.
//!
//! Every multi-byte integer on the wire is unsigned big-endian. Reads are
//! bounds-checked and never advance the cursor on failure; writes append to
//! an owned buffer and cannot fail.

use crate::error::{ParseError, Result, TextError};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Character encodings used by fixed-width text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-16 little-endian without BOM (PlayReady rights management header).
    Utf16Le,
    /// 7-bit US-ASCII.
    Ascii,
    Utf8,
}

impl TextEncoding {
    /// Decode `bytes` strictly, so that [`TextEncoding::encode`] of the
    /// result reproduces `bytes` exactly.
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, TextError> {
        match self {
            TextEncoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(TextError::OddLength(bytes.len()));
                }
                let units = bytes.chunks_exact(2).map(LittleEndian::read_u16);
                char::decode_utf16(units)
                    .map(|r| r.map_err(|e| TextError::UnpairedSurrogate(e.unpaired_surrogate())))
                    .collect()
            }
            TextEncoding::Ascii => {
                if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(TextError::NonAscii {
                        byte: bytes[offset],
                        offset,
                    });
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
            TextEncoding::Utf8 => Ok(std::str::from_utf8(bytes)?.to_owned()),
        }
    }

    pub fn encode(self, text: &str) -> std::result::Result<Vec<u8>, TextError> {
        match self {
            TextEncoding::Utf16Le => Ok(text
                .encode_utf16()
                .flat_map(|u| u.to_le_bytes())
                .collect()),
            TextEncoding::Ascii => match text.chars().find(|c| !c.is_ascii()) {
                Some(c) => Err(TextError::NonAsciiChar(c)),
                None => Ok(text.as_bytes().to_vec()),
            },
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        }
    }
}

/// Read cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(ParseError::UnexpectedEndOfInput {
                needed: n,
                available,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    /// 24-bit value, as used by FullBox flags.
    pub fn read_u24(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u24(self.read_bytes(3)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.read_bytes(8)?))
    }

    /// Read `len` bytes and decode them as text.
    ///
    /// The cursor only moves if the bytes decode.
    pub fn read_fixed_text(&mut self, len: usize, encoding: TextEncoding) -> Result<String> {
        let mut peek = self.clone();
        let text = encoding.decode(peek.read_bytes(len)?)?;
        *self = peek;
        Ok(text)
    }
}

/// Append-only big-endian writer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buffer; callers normally know the exact output length.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        let mut b = [0u8; 2];
        BigEndian::write_u16(&mut b, v);
        self.write_bytes(&b);
    }

    /// Writes the low 24 bits of `v`.
    pub fn write_u24(&mut self, v: u32) {
        let mut b = [0u8; 3];
        BigEndian::write_u24(&mut b, v & 0x00FF_FFFF);
        self.write_bytes(&b);
    }

    pub fn write_u32(&mut self, v: u32) {
        let mut b = [0u8; 4];
        BigEndian::write_u32(&mut b, v);
        self.write_bytes(&b);
    }

    pub fn write_u64(&mut self, v: u64) {
        let mut b = [0u8; 8];
        BigEndian::write_u64(&mut b, v);
        self.write_bytes(&b);
    }

    /// Encode `text` and append it; returns the number of bytes written.
    pub fn write_fixed_text(
        &mut self,
        text: &str,
        encoding: TextEncoding,
    ) -> std::result::Result<usize, TextError> {
        let bytes = encoding.encode(text)?;
        self.write_bytes(&bytes);
        Ok(bytes.len())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
