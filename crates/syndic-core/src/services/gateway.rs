//! Shared plumbing for the gateway services: error mapping, JSON
//! encoding, and the revision-checked read-modify-write loop.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::{DomainError, StoreError};
use crate::repositories::{Document, DocumentStore};

/// Field linking a per-apartment array document back to its apartment.
const OWNER_FIELD: &str = "apartmentId";

/// Log the store error and collapse it into the generic remote failure.
pub(crate) fn remote_failure(operation: &str, collection: &str, e: StoreError) -> DomainError {
    error!("{} on {} failed: {}", operation, collection, e);
    DomainError::RemoteOperationFailed(format!("{} {}", operation, collection))
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| {
        error!("Failed to encode document: {}", e);
        DomainError::RemoteOperationFailed("encode document".to_string())
    })
}

pub(crate) fn decode<T: DeserializeOwned>(document: &Document) -> Result<T, DomainError> {
    decode_value(document.body.clone(), &document.collection)
}

fn decode_value<T: DeserializeOwned>(value: Value, collection: &str) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        error!("Malformed document in {}: {}", collection, e);
        DomainError::RemoteOperationFailed(format!("decode {}", collection))
    })
}

pub(crate) fn fields(pairs: Vec<(&str, Value)>) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Read, compute, and write back only if nobody wrote in between.
/// A revision conflict recomputes against the fresh document.
pub(crate) async fn compare_and_swap<S, R, F>(
    store: &S,
    collection: &str,
    key: &str,
    max_attempts: u32,
    mut compute: F,
) -> Result<R, DomainError>
where
    S: DocumentStore + ?Sized,
    R: Send,
    F: FnMut(Option<Value>) -> Result<(Value, R), DomainError> + Send,
{
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        let current = store
            .get(collection, key)
            .await
            .map_err(|e| remote_failure("read", collection, e))?;
        let (expected, body) = match current {
            Some(doc) => (Some(doc.revision), Some(doc.body)),
            None => (None, None),
        };

        let (next, result) = compute(body)?;

        match store.replace_if(collection, key, expected, next).await {
            Ok(revision) => {
                debug!("Wrote {}/{} at revision {}", collection, key, revision);
                return Ok(result);
            }
            Err(StoreError::Conflict { .. }) => {
                warn!("Concurrent write on {}/{} (attempt {}/{})", collection, key, attempt, attempts);
            }
            Err(e) => return Err(remote_failure("write", collection, e)),
        }
    }

    error!("Giving up on {}/{} after {} conflicting writes", collection, key, attempts);
    Err(DomainError::RemoteOperationFailed(format!(
        "too many concurrent writes to {}",
        collection
    )))
}

/// Revision-checked update of a single existing document.
pub(crate) async fn modify_document<S, T, F>(
    store: &S,
    collection: &str,
    key: &str,
    entity: &str,
    max_attempts: u32,
    mut apply: F,
) -> Result<T, DomainError>
where
    S: DocumentStore + ?Sized,
    T: Serialize + DeserializeOwned + Clone + Send,
    F: FnMut(&mut T) -> Result<(), DomainError> + Send,
{
    compare_and_swap(store, collection, key, max_attempts, |body| {
        let body = body.ok_or_else(|| DomainError::not_found(entity))?;
        let mut value: T = decode_value(body, collection)?;
        apply(&mut value)?;
        Ok((encode(&value)?, value))
    })
    .await
}

/// One array of entries per apartment, stored under `field`.
pub(crate) struct ArrayDocument<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    collection: &'static str,
    field: &'static str,
    max_attempts: u32,
}

impl<'a, S: DocumentStore + ?Sized> ArrayDocument<'a, S> {
    pub(crate) fn new(store: &'a S, collection: &'static str, field: &'static str, max_attempts: u32) -> Self {
        Self {
            store,
            collection,
            field,
            max_attempts,
        }
    }

    pub(crate) async fn load<T: DeserializeOwned>(&self, apartment_id: &str) -> Result<Vec<T>, DomainError> {
        let document = self
            .store
            .get(self.collection, apartment_id)
            .await
            .map_err(|e| remote_failure("read", self.collection, e))?;

        match document {
            Some(doc) => self.items(&doc.body),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) async fn mutate<T, R, F>(&self, apartment_id: &str, mut apply: F) -> Result<R, DomainError>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnMut(&mut Vec<T>) -> Result<R, DomainError> + Send,
    {
        let field = self.field;
        let collection = self.collection;
        compare_and_swap(self.store, collection, apartment_id, self.max_attempts, |body| {
            let mut body = body.unwrap_or_else(|| {
                Value::Object(fields(vec![(OWNER_FIELD, Value::String(apartment_id.to_string()))]))
            });
            let mut items: Vec<T> = self.items(&body)?;
            let result = apply(&mut items)?;

            let object = body.as_object_mut().ok_or_else(|| {
                error!("Document {}/{} is not an object", collection, apartment_id);
                DomainError::RemoteOperationFailed(format!("decode {}", collection))
            })?;
            object.insert(field.to_string(), encode(&items)?);
            Ok((body, result))
        })
        .await
    }

    fn items<T: DeserializeOwned>(&self, body: &Value) -> Result<Vec<T>, DomainError> {
        match body.get(self.field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items) => decode_value(items.clone(), self.collection),
        }
    }
}
