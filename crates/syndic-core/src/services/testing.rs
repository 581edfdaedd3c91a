//! In-process document store for the service tests

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{Actor, Role};
use crate::error::StoreError;
use crate::repositories::{Document, DocumentStore, Revision};

#[derive(Default)]
pub(crate) struct FakeStore {
    docs: Mutex<HashMap<(String, String), (Revision, Value)>>,
    /// Number of upcoming `replace_if` calls that lose a race.
    pub(crate) forced_conflicts: AtomicU32,
    pub(crate) failing: AtomicBool,
}

impl FakeStore {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn revision(&self, collection: &str, key: &str) -> Option<Revision> {
        self.docs
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .map(|(r, _)| *r)
    }

    fn check_failing(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        Ok(())
    }
}

fn id(collection: &str, key: &str) -> (String, String) {
    (collection.to_string(), key.to_string())
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        self.check_failing()?;
        Ok(self.docs.lock().unwrap().get(&id(collection, key)).map(|(rev, body)| Document {
            collection: collection.to_string(),
            key: key.to_string(),
            revision: *rev,
            body: body.clone(),
        }))
    }

    async fn set(&self, collection: &str, key: &str, body: Value) -> Result<Revision, StoreError> {
        self.check_failing()?;
        let mut docs = self.docs.lock().unwrap();
        let entry = docs.entry(id(collection, key)).or_insert((0, Value::Null));
        entry.0 += 1;
        entry.1 = body;
        Ok(entry.0)
    }

    async fn update_fields(&self, collection: &str, key: &str, fields: Map<String, Value>) -> Result<Revision, StoreError> {
        self.check_failing()?;
        let mut docs = self.docs.lock().unwrap();
        let (rev, body) = docs.get_mut(&id(collection, key)).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        })?;
        if let Some(object) = body.as_object_mut() {
            object.extend(fields);
        }
        *rev += 1;
        Ok(*rev)
    }

    async fn array_union(&self, collection: &str, key: &str, field: &str, values: Vec<Value>) -> Result<Revision, StoreError> {
        self.check_failing()?;
        let mut docs = self.docs.lock().unwrap();
        let (rev, body) = docs
            .entry(id(collection, key))
            .or_insert((0, Value::Object(Map::new())));
        if let Some(object) = body.as_object_mut() {
            let array = object.entry(field.to_string()).or_insert_with(|| Value::Array(Vec::new()));
            if let Some(items) = array.as_array_mut() {
                for value in values {
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
            }
        }
        *rev += 1;
        Ok(*rev)
    }

    async fn replace_if(
        &self,
        collection: &str,
        key: &str,
        expected: Option<Revision>,
        body: Value,
    ) -> Result<Revision, StoreError> {
        self.check_failing()?;
        let mut docs = self.docs.lock().unwrap();
        let actual = docs.get(&id(collection, key)).map(|(r, _)| *r);

        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            // Simulate another client writing first.
            if let Some((rev, _)) = docs.get_mut(&id(collection, key)) {
                *rev += 1;
            }
        }

        if forced || actual != expected {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                key: key.to_string(),
                expected,
                actual,
            });
        }

        let revision = actual.unwrap_or(0) + 1;
        docs.insert(id(collection, key), (revision, body));
        Ok(revision)
    }

    async fn find_by_field(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>, StoreError> {
        self.check_failing()?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), (_, body))| c == collection && body.get(field) == Some(value))
            .map(|((c, k), (rev, body))| Document {
                collection: c.clone(),
                key: k.clone(),
                revision: *rev,
                body: body.clone(),
            })
            .collect())
    }
}

pub(crate) fn syndic(apartment_id: &str) -> Actor {
    Actor::new("u-syndic", "Samir").with_membership(Role::Syndic, apartment_id)
}

pub(crate) fn resident(apartment_id: &str) -> Actor {
    Actor::new("u-resident", "Rania").with_membership(Role::Resident, apartment_id)
}
