//! The record model shared between the local store and the remote store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The outgoing remote document shape: a JSON object.
pub type Document = Map<String, Value>;

/// A read-only snapshot of one local record, taken at fetch time.
///
/// The `id` is the stable key shared between the local and remote
/// representations of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncableRecord {
    /// Stable record identifier.
    pub id: String,
    /// The record's fields as stored locally.
    pub fields: Map<String, Value>,
}

impl SyncableRecord {
    /// Create a record with no fields.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

/// A (local collection, remote collection) pair the reconciler must cover.
///
/// The full list is fixed at service construction and immutable for the
/// process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Name of the collection in the local store.
    pub local: String,
    /// Name of the collection in the remote store.
    pub remote: String,
}

impl CollectionSpec {
    /// Create a spec with distinct local and remote names.
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }

    /// Create a spec whose local and remote names are the same.
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            local: name.clone(),
            remote: name,
        }
    }
}

/// The currently signed-in identity, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque user identifier.
    pub uid: String,
}

impl Principal {
    /// Create a principal from a user identifier.
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uid)
    }
}
