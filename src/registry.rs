use crate::codec::TextEncoding;
use crate::record::{
    BlobRecord, EMBEDDED_LICENSE_STORE, RESERVED, RM_HEADER, Record, RecordTag, TextRecord,
    UnknownRecord,
};
use std::collections::HashMap;

/// Produces an empty record ready to parse a payload for `tag`.
///
/// Any `Fn(RecordTag) -> Box<dyn Record>` closure is a factory, so a
/// registration is usually a one-liner.
pub trait RecordFactory: Send + Sync {
    fn create(&self, tag: RecordTag) -> Box<dyn Record>;
}

impl<F> RecordFactory for F
where
    F: Fn(RecordTag) -> Box<dyn Record> + Send + Sync,
{
    fn create(&self, tag: RecordTag) -> Box<dyn Record> {
        self(tag)
    }
}

/// Registry of record factories keyed by [`RecordTag`].
///
/// Parsing only ever borrows the registry immutably; new tags are added with
/// [`Registry::register`] or fluently with [`Registry::with_factory`].
pub struct Registry {
    map: HashMap<RecordTag, RecordFactoryEntry>,
}

struct RecordFactoryEntry {
    inner: Box<dyn RecordFactory>,
    name: String,
}

impl Registry {
    /// Create an empty registry. Every tag resolves to [`UnknownRecord`].
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Add or replace the factory for `tag`.
    ///
    /// `name` is human-readable and used only for debugging / logging.
    pub fn register(&mut self, tag: RecordTag, name: &str, factory: impl RecordFactory + 'static) {
        if self.map.contains_key(&tag) {
            tracing::debug!(%tag, name, "replacing record factory");
        }
        self.map.insert(
            tag,
            RecordFactoryEntry {
                inner: Box::new(factory),
                name: name.to_string(),
            },
        );
    }

    /// Return a new registry with the given factory added.
    pub fn with_factory(
        mut self,
        tag: RecordTag,
        name: &str,
        factory: impl RecordFactory + 'static,
    ) -> Self {
        self.register(tag, name, factory);
        self
    }

    /// Instantiate an empty record for `tag`, falling back to
    /// [`UnknownRecord`] when nothing is registered.
    pub fn create(&self, tag: RecordTag) -> Box<dyn Record> {
        match self.map.get(&tag) {
            Some(entry) => entry.inner.create(tag),
            None => {
                tracing::debug!(%tag, "no factory registered, using pass-through record");
                Box::new(UnknownRecord::new(tag))
            }
        }
    }

    pub fn contains(&self, tag: RecordTag) -> bool {
        self.map.contains_key(&tag)
    }

    pub fn name_of(&self, tag: RecordTag) -> Option<&str> {
        self.map.get(&tag).map(|e| e.name.as_str())
    }

    /// Registered tags in ascending order.
    pub fn tags(&self) -> Vec<RecordTag> {
        let mut tags: Vec<_> = self.map.keys().copied().collect();
        tags.sort();
        tags
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------- Default registry ----------

/// Registry for PlayReady objects: the rights management header as
/// UTF-16LE text, reserved and embedded license store records as blobs.
pub fn playready_registry() -> Registry {
    Registry::new()
        .with_factory(RM_HEADER, "rm_header", |tag: RecordTag| {
            Box::new(TextRecord::new(tag, TextEncoding::Utf16Le)) as Box<dyn Record>
        })
        .with_factory(RESERVED, "reserved", |tag: RecordTag| {
            Box::new(BlobRecord::new(tag)) as Box<dyn Record>
        })
        .with_factory(EMBEDDED_LICENSE_STORE, "embedded_license_store", |tag: RecordTag| {
            Box::new(BlobRecord::new(tag)) as Box<dyn Record>
        })
}
