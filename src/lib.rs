pub mod boxes;
pub mod codec;
pub mod container;
pub mod error;
pub mod json_api;
pub mod parser;
pub mod pssh;
pub mod record;
pub mod registry;
pub mod util;

pub use boxes::{FourCC, Guid, PLAYREADY_SYSTEM_ID};
pub use codec::{ByteReader, ByteWriter, TextEncoding};
pub use container::Container;
pub use error::{EncodeError, ParseError, TextError};
pub use pssh::{ProtectionData, PsshBox};
pub use record::{BlobRecord, Record, RecordTag, RecordValue, TextRecord, UnknownRecord};
pub use registry::{Registry, RecordFactory, playready_registry};
