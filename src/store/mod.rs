//! The entity store seam.
//!
//! The engine reads and writes flat records keyed by `(kind, id)` and
//! nothing else: no scans, no queries. Durable persistence is the
//! embedder's concern; [`MemoryStore`] is the provided in-process
//! implementation and is what the engine is tested against. Writes are
//! visible to reads within the same processing step (single writer).

use std::any::Any;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record the store can hold.
///
/// `KIND` namespaces ids; `id()` is the record's primary key within the
/// kind. The serde bounds keep every record persistable by embedders that
/// back the store with something durable.
pub trait Entity: Clone + Serialize + DeserializeOwned + 'static {
    /// Namespace for this record type
    const KIND: &'static str;

    /// Primary key within the kind
    fn id(&self) -> &str;
}

/// Keyed record storage with load, create-or-update, and delete.
pub trait EntityStore {
    /// Load a record, or `None` when absent.
    fn get<E: Entity>(&self, id: &str) -> Option<E>;

    /// Create or overwrite a record.
    fn put<E: Entity>(&mut self, entity: E);

    /// Remove a record. Removing an absent record is a no-op.
    fn delete<E: Entity>(&mut self, id: &str);
}

/// Hash-map backed store with read-your-writes consistency.
#[derive(Default)]
pub struct MemoryStore {
    /// Records keyed by `(kind, id)`
    records: HashMap<(&'static str, String), Box<dyn Any>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records of one kind; used by tests and diagnostics.
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.records.keys().filter(|(k, _)| *k == kind).count()
    }
}

impl EntityStore for MemoryStore {
    fn get<E: Entity>(&self, id: &str) -> Option<E> {
        self.records
            .get(&(E::KIND, id.to_string()))
            .and_then(|boxed| boxed.downcast_ref::<E>())
            .cloned()
    }

    fn put<E: Entity>(&mut self, entity: E) {
        self.records
            .insert((E::KIND, entity.id().to_string()), Box::new(entity));
    }

    fn delete<E: Entity>(&mut self, id: &str) {
        self.records.remove(&(E::KIND, id.to_string()));
    }
}
