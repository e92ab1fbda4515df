//! Document store abstraction

use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier format check applied before any storage access.
    pub fn parse(raw: &str) -> Result<Self> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::InvalidId(raw.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Uuid> for DocumentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// A self-describing record in a named collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub body: Map<String, JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-document operations over named collections.
///
/// Updates have `$set` semantics: every key in `changes` is written and a
/// `null` value removes the key. Stored bodies never contain nulls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return it with its assigned id.
    async fn insert(&self, collection: &str, body: Map<String, JsonValue>) -> Result<Document>;

    /// All documents in a collection, oldest first.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Apply `changes` to the document with `id`. `None` when it does not exist.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, JsonValue>,
    ) -> Result<Option<Document>>;

    /// Remove the document with `id`. `None` when it does not exist.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<()>;

    /// Make the store ready for use. Idempotent.
    async fn prepare(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Apply `$set` changes to a body in place.
pub fn apply_changes(body: &mut Map<String, JsonValue>, changes: Map<String, JsonValue>) {
    for (key, value) in changes {
        if value.is_null() {
            body.remove(&key);
        } else {
            body.insert(key, value);
        }
    }
}

/// Drop top-level nulls from a body about to be stored.
pub fn strip_nulls(body: Map<String, JsonValue>) -> Map<String, JsonValue> {
    body.into_iter().filter(|(_, v)| !v.is_null()).collect()
}
