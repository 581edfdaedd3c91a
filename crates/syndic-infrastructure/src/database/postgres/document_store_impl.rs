// ============================================================================
// Syndic Infrastructure - PostgreSQL Document Store
// File: crates/syndic-infrastructure/src/database/postgres/document_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};

use syndic_core::error::StoreError;
use syndic_core::repositories::{Document, DocumentStore, Revision};

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_revision(&self, collection: &str, key: &str) -> Result<Option<Revision>, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT revision FROM documents WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend("reading revision", e))
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct DocumentRow {
    key: String,
    revision: i64,
    body: Json<Value>,
}

impl DocumentRow {
    fn into_document(self, collection: &str) -> Document {
        Document {
            collection: collection.to_string(),
            key: self.key,
            revision: self.revision,
            body: self.body.0,
        }
    }
}

fn backend(context: &str, e: sqlx::Error) -> StoreError {
    error!("Database error {}: {}", context, e);
    StoreError::Backend(e.to_string())
}

fn conflict(collection: &str, key: &str, expected: Option<Revision>, actual: Option<Revision>) -> StoreError {
    StoreError::Conflict {
        collection: collection.to_string(),
        key: key.to_string(),
        expected,
        actual,
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            SELECT key, revision, body
            FROM documents
            WHERE collection = $1 AND key = $2
            "#,
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("reading document", e))?;

        Ok(row.map(|r| r.into_document(collection)))
    }

    async fn set(&self, collection: &str, key: &str, body: Value) -> Result<Revision, StoreError> {
        let revision: i64 = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO documents (collection, key, revision, body)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (collection, key) DO UPDATE
            SET body = EXCLUDED.body,
                revision = documents.revision + 1,
                updated_at = now()
            RETURNING revision
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(Json(body))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| backend("writing document", e))?;

        debug!("Set {}/{} at revision {}", collection, key, revision);
        Ok(revision)
    }

    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<Revision, StoreError> {
        let revision: Option<i64> = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE documents
            SET body = body || $3,
                revision = revision + 1,
                updated_at = now()
            WHERE collection = $1 AND key = $2
            RETURNING revision
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(Json(Value::Object(fields)))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("updating fields", e))?;

        revision.ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }

    async fn array_union(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<Revision, StoreError> {
        let mut unique: Vec<Value> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }

        // Appends the values not already present, keeping existing order.
        let revision: i64 = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO documents (collection, key, revision, body)
            VALUES ($1, $2, 1, jsonb_build_object($3::text, $4::jsonb))
            ON CONFLICT (collection, key) DO UPDATE
            SET body = jsonb_set(
                    documents.body,
                    ARRAY[$3::text],
                    COALESCE(documents.body -> $3::text, '[]'::jsonb) || COALESCE(
                        (SELECT jsonb_agg(v)
                         FROM jsonb_array_elements($4::jsonb) AS v
                         WHERE NOT COALESCE(documents.body -> $3::text, '[]'::jsonb) @> jsonb_build_array(v)),
                        '[]'::jsonb
                    )
                ),
                revision = documents.revision + 1,
                updated_at = now()
            RETURNING revision
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(field)
        .bind(Json(Value::Array(unique)))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| backend("updating array", e))?;

        Ok(revision)
    }

    async fn replace_if(
        &self,
        collection: &str,
        key: &str,
        expected: Option<Revision>,
        body: Value,
    ) -> Result<Revision, StoreError> {
        let written: Option<i64> = match expected {
            None => sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO documents (collection, key, revision, body)
                VALUES ($1, $2, 1, $3)
                ON CONFLICT (collection, key) DO NOTHING
                RETURNING revision
                "#,
            )
            .bind(collection)
            .bind(key)
            .bind(Json(body))
            .fetch_optional(&self.pool)
            .await,
            Some(revision) => sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE documents
                SET body = $3,
                    revision = revision + 1,
                    updated_at = now()
                WHERE collection = $1 AND key = $2 AND revision = $4
                RETURNING revision
                "#,
            )
            .bind(collection)
            .bind(key)
            .bind(Json(body))
            .bind(revision)
            .fetch_optional(&self.pool)
            .await,
        }
        .map_err(|e| backend("conditional write", e))?;

        match written {
            Some(revision) => Ok(revision),
            None => {
                let actual = self.current_revision(collection, key).await?;
                Err(conflict(collection, key, expected, actual))
            }
        }
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r#"
            SELECT key, revision, body
            FROM documents
            WHERE collection = $1 AND body @> jsonb_build_object($2::text, $3::jsonb)
            ORDER BY created_at
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("querying documents", e))?;

        Ok(rows.into_iter().map(|r| r.into_document(collection)).collect())
    }
}
