//! DashMap-backed document store, used by the demo and the integration tests

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use syndic_core::error::StoreError;
use syndic_core::repositories::{Document, DocumentStore, Revision};

#[derive(Debug, Clone)]
struct StoredDocument {
    revision: Revision,
    body: Value,
    /// Insertion order, so queries return oldest first like the SQL store.
    sequence: u64,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<(String, String), StoredDocument>,
    sequence: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn fresh(&self, body: Value) -> StoredDocument {
        StoredDocument {
            revision: 1,
            body,
            sequence: self.next_sequence(),
        }
    }
}

fn key_of(collection: &str, key: &str) -> (String, String) {
    (collection.to_string(), key.to_string())
}

fn not_found(collection: &str, key: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        key: key.to_string(),
    }
}

fn object_mut<'a>(body: &'a mut Value, collection: &str, key: &str) -> Result<&'a mut Map<String, Value>, StoreError> {
    body.as_object_mut()
        .ok_or_else(|| StoreError::InvalidBody(format!("{}/{} is not an object", collection, key)))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.get(&key_of(collection, key)).map(|stored| Document {
            collection: collection.to_string(),
            key: key.to_string(),
            revision: stored.revision,
            body: stored.body.clone(),
        }))
    }

    async fn set(&self, collection: &str, key: &str, body: Value) -> Result<Revision, StoreError> {
        let revision = match self.documents.entry(key_of(collection, key)) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                stored.revision += 1;
                stored.body = body;
                stored.revision
            }
            Entry::Vacant(entry) => entry.insert(self.fresh(body)).revision,
        };
        debug!("Set {}/{} at revision {}", collection, key, revision);
        Ok(revision)
    }

    async fn update_fields(&self, collection: &str, key: &str, fields: Map<String, Value>) -> Result<Revision, StoreError> {
        let mut stored = self
            .documents
            .get_mut(&key_of(collection, key))
            .ok_or_else(|| not_found(collection, key))?;
        object_mut(&mut stored.body, collection, key)?.extend(fields);
        stored.revision += 1;
        Ok(stored.revision)
    }

    async fn array_union(&self, collection: &str, key: &str, field: &str, values: Vec<Value>) -> Result<Revision, StoreError> {
        let mut stored = self
            .documents
            .entry(key_of(collection, key))
            .or_insert_with(|| StoredDocument {
                revision: 0,
                body: Value::Object(Map::new()),
                sequence: self.next_sequence(),
            });

        let object = object_mut(&mut stored.body, collection, key)?;
        let items = object
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| StoreError::InvalidBody(format!("{}/{}.{} is not an array", collection, key, field)))?;
        for value in values {
            if !items.contains(&value) {
                items.push(value);
            }
        }

        stored.revision += 1;
        Ok(stored.revision)
    }

    async fn replace_if(
        &self,
        collection: &str,
        key: &str,
        expected: Option<Revision>,
        body: Value,
    ) -> Result<Revision, StoreError> {
        let conflict = |actual: Option<Revision>| StoreError::Conflict {
            collection: collection.to_string(),
            key: key.to_string(),
            expected,
            actual,
        };

        match (self.documents.entry(key_of(collection, key)), expected) {
            (Entry::Vacant(entry), None) => Ok(entry.insert(self.fresh(body)).revision),
            (Entry::Vacant(_), Some(_)) => Err(conflict(None)),
            (Entry::Occupied(mut entry), Some(revision)) if entry.get().revision == revision => {
                let stored = entry.get_mut();
                stored.revision += 1;
                stored.body = body;
                Ok(stored.revision)
            }
            (Entry::Occupied(entry), _) => Err(conflict(Some(entry.get().revision))),
        }
    }

    async fn find_by_field(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        let mut matches: Vec<(u64, Document)> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection && entry.value().body.get(field) == Some(value))
            .map(|entry| {
                (
                    entry.value().sequence,
                    Document {
                        collection: collection.to_string(),
                        key: entry.key().1.clone(),
                        revision: entry.value().revision,
                        body: entry.value().body.clone(),
                    },
                )
            })
            .collect();
        matches.sort_by_key(|(sequence, _)| *sequence);
        Ok(matches.into_iter().map(|(_, doc)| doc).collect())
    }
}
