use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else {
            None
        }
    }
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}
impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

pub const PSSH: FourCC = FourCC(*b"pssh");
pub const UUID: FourCC = FourCC(*b"uuid");

/// 16-byte identifier: DRM system IDs, key IDs and `uuid` box user types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    /// Parse 32 hex digits, with or without dashes.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits: String = s.chars().filter(|&c| c != '-').collect();
        let bytes = hex::decode(digits).ok()?;
        let arr: [u8; 16] = bytes.try_into().ok()?;
        Some(Guid(arr))
    }

    /// Name of a well-known DRM system, if this is one.
    pub fn known_name(&self) -> Option<&'static str> {
        match *self {
            PLAYREADY_SYSTEM_ID => Some("PlayReady"),
            WIDEVINE_SYSTEM_ID => Some("Widevine"),
            CLEARKEY_SYSTEM_ID => Some("ClearKey"),
            FAIRPLAY_SYSTEM_ID => Some("FairPlay"),
            _ => None,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{}-{}-{}-{}-{}",
            hex::encode(&b[0..4]),
            hex::encode(&b[4..6]),
            hex::encode(&b[6..8]),
            hex::encode(&b[8..10]),
            hex::encode(&b[10..16])
        )
    }
}
impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

pub const PLAYREADY_SYSTEM_ID: Guid = Guid([
    0x9a, 0x04, 0xf0, 0x79, 0x98, 0x40, 0x42, 0x86, 0xab, 0x92, 0xe6, 0x5b, 0xe0, 0x88, 0x5f, 0x95,
]);
pub const WIDEVINE_SYSTEM_ID: Guid = Guid([
    0xed, 0xef, 0x8b, 0xa9, 0x79, 0xd6, 0x4a, 0xce, 0xa3, 0xc8, 0x27, 0xdc, 0xd5, 0x1d, 0x21, 0xed,
]);
pub const CLEARKEY_SYSTEM_ID: Guid = Guid([
    0x10, 0x77, 0xef, 0xec, 0xc0, 0xb2, 0x4d, 0x02, 0xac, 0xe3, 0x3c, 0x1e, 0x52, 0xe2, 0xfb, 0x4b,
]);
pub const FAIRPLAY_SYSTEM_ID: Guid = Guid([
    0x94, 0xce, 0x86, 0xfb, 0x07, 0xff, 0x4f, 0x43, 0xad, 0xb8, 0x93, 0xd2, 0xfa, 0x96, 0x8c, 0xa2,
]);
/// User type of the PIFF 1.1 protection system specific header `uuid` box.
pub const PIFF_PSSH_USERTYPE: Guid = Guid([
    0xd0, 0x8a, 0x4f, 0x18, 0x10, 0xf3, 0x4a, 0x82, 0xb6, 0xc8, 0x32, 0xd8, 0xab, 0xa1, 0x83, 0xd3,
]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u64,          // total size including header, or 0=to end of buffer
    pub typ: FourCC,        // 4CC or b"uuid"
    pub uuid: Option<Guid>,
    pub header_size: u64,   // 8, 16, 24 or 32
    pub large_size: bool,   // size came from the 64-bit field
}
