//! Per-user document collections.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{error::StoreError, identity::User};

pub mod codec;
mod firestore;
mod memory;

pub use firestore::{DEFAULT_FIRESTORE_URL, Firestore};
pub use memory::MemoryStore;

/// A collection addressed relative to the database root,
/// e.g. `users/{uid}/analyses`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    parent: String,
    collection_id: String,
}

impl CollectionPath {
    pub fn new(parent: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            collection_id: collection_id.into(),
        }
    }

    pub fn user_analyses(uid: &str) -> Self {
        Self::new(format!("users/{uid}"), "analyses")
    }

    /// Document path of the parent, empty for a root collection.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parent.is_empty() {
            f.write_str(&self.collection_id)
        } else {
            write!(f, "{}/{}", self.parent, self.collection_id)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    /// Plain JSON fields, already decoded from the store's wire format.
    pub fields: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates a document with a fresh id. `server_timestamp_field` is set
    /// by the store to its own write time. Returns the new id.
    async fn add(
        &self,
        user: &User,
        collection: &CollectionPath,
        fields: Map<String, Value>,
        server_timestamp_field: &str,
    ) -> Result<String, StoreError>;

    /// Every document in `collection` that has `order_by`, sorted on it.
    async fn query_ordered(
        &self,
        user: &User,
        collection: &CollectionPath,
        order_by: &str,
        direction: Direction,
    ) -> Result<Vec<Document>, StoreError>;
}
