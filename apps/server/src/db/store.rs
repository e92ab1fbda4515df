//! PostgreSQL-backed `DocumentStore` implementation
//!
//! Documents are rows of a single `documents` table keyed by UUID, with the
//! record itself in a JSONB `body` column. The pool is created lazily, so the
//! schema is prepared on first successful use rather than at construction.

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use sqlx::{postgres::PgRow, PgPool, Row};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    db::traits::{Document, DocumentId, DocumentStore},
    Error, Result,
};

const RETURNING: &str = "RETURNING id, body, created_at, updated_at";

/// PostgreSQL-backed DocumentStore implementation
pub struct PostgresDocumentStore {
    pool: PgPool,
    schema_ready: OnceCell<()>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema_ready: OnceCell::new(),
        }
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&self.pool).await?;
                tracing::info!("Database migrations complete");
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }
}

fn row_to_document(row: PgRow) -> Result<Document> {
    let id: Uuid = row.try_get("id")?;
    let body = match row.try_get::<JsonValue, _>("body")? {
        JsonValue::Object(map) => map,
        other => {
            return Err(Error::Internal(format!(
                "Document {id} has a non-object body: {other}"
            )))
        }
    };

    Ok(Document {
        id: DocumentId::from(id),
        body,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, collection: &str, body: Map<String, JsonValue>) -> Result<Document> {
        self.ensure_schema().await?;

        let sql = format!(
            "INSERT INTO documents (id, collection, body)
             VALUES ($1, $2, jsonb_strip_nulls($3))
             {RETURNING}"
        );

        let row = sqlx::query(&sql)
            .bind(DocumentId::generate().as_uuid())
            .bind(collection)
            .bind(JsonValue::Object(body))
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        row_to_document(row)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.ensure_schema().await?;

        let rows = sqlx::query(
            "SELECT id, body, created_at, updated_at
             FROM documents
             WHERE collection = $1
             ORDER BY seq ASC",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(row_to_document).collect()
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, JsonValue>,
    ) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;
        self.ensure_schema().await?;

        // `||` overwrites top-level keys; stripping afterwards turns null values into removals.
        let sql = format!(
            "UPDATE documents
             SET body = jsonb_strip_nulls(body || $3), updated_at = NOW()
             WHERE collection = $1 AND id = $2
             {RETURNING}"
        );

        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(id.as_uuid())
            .bind(JsonValue::Object(changes))
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(row_to_document).transpose()
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;
        self.ensure_schema().await?;

        let sql = format!(
            "DELETE FROM documents
             WHERE collection = $1 AND id = $2
             {RETURNING}"
        );

        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(row_to_document).transpose()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        self.ping().await?;
        self.ensure_schema().await
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
