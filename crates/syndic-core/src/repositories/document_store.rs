//! Document store trait (port)

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Store-assigned version of a document, bumped on every write.
pub type Revision = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub collection: String,
    pub key: String,
    pub revision: Revision,
    pub body: Value,
}

/// Documents keyed by (collection, key) holding a JSON object body.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Create or replace unconditionally.
    async fn set(&self, collection: &str, key: &str, body: Value) -> Result<Revision, StoreError>;

    /// Merge top-level fields into an existing document.
    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<Revision, StoreError>;

    /// Append values missing from the array `field`, creating document and field if needed.
    async fn array_union(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<Revision, StoreError>;

    /// Replace only if the stored revision equals `expected`
    /// (`None` means the document must not exist yet).
    async fn replace_if(
        &self,
        collection: &str,
        key: &str,
        expected: Option<Revision>,
        body: Value,
    ) -> Result<Revision, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;
}
