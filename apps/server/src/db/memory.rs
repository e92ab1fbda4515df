//! In-process `DocumentStore` implementation.
//!
//! Documents live in a vector per collection, so `find_all` returns them in
//! insertion order. Used by the integration tests and for running the server
//! without a database (`database.backend = "memory"`).

use crate::{
    db::traits::{apply_changes, strip_nulls, Document, DocumentId, DocumentStore},
    Result,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, body: Map<String, JsonValue>) -> Result<Document> {
        let now = Utc::now();
        let document = Document {
            id: DocumentId::generate(),
            body: strip_nulls(body),
            created_at: now,
            updated_at: now,
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, JsonValue>,
    ) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;

        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(None);
        };

        apply_changes(&mut document.body, changes);
        document.updated_at = Utc::now();

        Ok(Some(document.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let id = DocumentId::parse(id)?;

        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };

        Ok(docs
            .iter()
            .position(|d| d.id == id)
            .map(|index| docs.remove(index)))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
