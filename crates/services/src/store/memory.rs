use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{CollectionPath, Direction, Document, DocumentStore};
use crate::{error::StoreError, identity::User};

/// Collections held in process memory. Timestamps are RFC 3339 strings, as
/// the Firestore codec produces them.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<CollectionPath, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document as-is, for seeding.
    pub fn insert(&self, collection: &CollectionPath, document: Document) {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.clone())
            .or_default()
            .push(document);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(
        &self,
        _user: &User,
        collection: &CollectionPath,
        mut fields: Map<String, Value>,
        server_timestamp_field: &str,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        fields.insert(server_timestamp_field.to_string(), Value::String(now));
        self.insert(
            collection,
            Document {
                id: id.clone(),
                fields,
            },
        );
        Ok(id)
    }

    async fn query_ordered(
        &self,
        _user: &User,
        collection: &CollectionPath,
        order_by: &str,
        direction: Direction,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.fields.contains_key(order_by))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        docs.sort_by(|a, b| compare(&a.fields[order_by], &b.fields[order_by]));
        if direction == Direction::Descending {
            docs.reverse();
        }
        Ok(docs)
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user() -> User {
        User {
            uid: "u1".to_string(),
            email: "u1@example.com".to_string(),
            ..User::default()
        }
    }

    fn doc(id: &str, at: &str) -> Document {
        let mut fields = Map::new();
        fields.insert("uploadedAt".to_string(), json!(at));
        Document {
            id: id.to_string(),
            fields,
        }
    }

    #[tokio::test]
    async fn query_orders_descending_and_skips_missing_field() {
        let store = MemoryStore::new();
        let path = CollectionPath::user_analyses("u1");
        store.insert(&path, doc("old", "2024-01-01T00:00:00.000000Z"));
        store.insert(&path, doc("new", "2024-03-01T00:00:00.000000Z"));
        store.insert(
            &path,
            Document {
                id: "undated".to_string(),
                fields: Map::new(),
            },
        );

        let docs = store
            .query_ordered(&user(), &path, "uploadedAt", Direction::Descending)
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
    }

    #[tokio::test]
    async fn add_stamps_the_timestamp_field() {
        let store = MemoryStore::new();
        let path = CollectionPath::user_analyses("u1");
        let id = store
            .add(&user(), &path, Map::new(), "uploadedAt")
            .await
            .unwrap();

        let docs = store
            .query_ordered(&user(), &path, "uploadedAt", Direction::Ascending)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert!(docs[0].fields["uploadedAt"].is_string());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .add(&user(), &CollectionPath::user_analyses("u1"), Map::new(), "t")
            .await
            .unwrap();
        let other = store
            .query_ordered(
                &user(),
                &CollectionPath::user_analyses("u2"),
                "t",
                Direction::Descending,
            )
            .await
            .unwrap();
        assert!(other.is_empty());
    }
}
