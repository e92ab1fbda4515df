//! Shared helpers for integration tests.
//!
//! Each test gets a fresh router backed by an in-memory document store and
//! drives it in-process through `tower::ServiceExt::oneshot`.

use anyhow::Context as _;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use roster::{
    api::create_router,
    config::{Config, StoreBackend},
    db::{Document, DocumentStore, InMemoryDocumentStore},
    state::AppState,
    Error,
};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(InMemoryDocumentStore::new()))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let state = AppState::with_store(config, store);
        let router = create_router(state.clone());
        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Body>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder.body(body.unwrap_or_else(Body::empty))?;
        self.send(request).await
    }

    pub async fn request_with_content_type(
        &self,
        method: Method,
        uri: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(body.into())?;
        self.send(request).await
    }

    pub async fn request_with_header(
        &self,
        method: Method,
        uri: &str,
        name: &str,
        value: &str,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(name, value)
            .body(Body::empty())?;
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("router call failed")?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, body))
    }

    /// `GET /users` and return the `data` array.
    pub async fn list_users(&self) -> anyhow::Result<Vec<JsonValue>> {
        let (status, _headers, body) = self.request(Method::GET, "/users", None).await?;
        assert_status(status, StatusCode::OK, "list users");
        let envelope: JsonValue = serde_json::from_slice(&body)?;
        anyhow::ensure!(
            envelope["status"] == "SUCCESS",
            "list users failed: {envelope}"
        );
        envelope["data"]
            .as_array()
            .cloned()
            .context("list envelope has a data array")
    }

    /// `POST /users` with a JSON body and return the parsed envelope.
    pub async fn create_user(&self, user: &JsonValue) -> anyhow::Result<JsonValue> {
        let (_status, _headers, body) = self
            .request(Method::POST, "/users", Some(to_json_body(user)?))
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Create a user and return the id the store assigned to it.
    pub async fn create_user_returning_id(&self, user: &JsonValue) -> anyhow::Result<String> {
        let before: Vec<String> = self.list_users().await?.iter().map(user_id).collect();
        let envelope = self.create_user(user).await?;
        anyhow::ensure!(envelope["status"] == "SUCCESS", "create failed: {envelope}");
        self.list_users()
            .await?
            .iter()
            .map(user_id)
            .find(|id| !before.contains(id))
            .context("created user shows up in the list")
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.backend = StoreBackend::Memory;
    config
}

pub async fn with_test_app<F, Fut>(test: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    with_test_app_with_config(|_| {}, test).await
}

pub async fn with_test_app_with_config<C, F, Fut>(configure: C, test: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    let mut config = test_config();
    configure(&mut config);
    test(TestApp::new(config)).await
}

pub fn to_json_body(value: &JsonValue) -> anyhow::Result<Body> {
    Ok(Body::from(serde_json::to_vec(value)?))
}

pub fn user_id(user: &JsonValue) -> String {
    user["id"].as_str().unwrap_or_default().to_string()
}

pub fn parse_envelope(body: &[u8]) -> anyhow::Result<JsonValue> {
    Ok(serde_json::from_slice(body)?)
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

pub fn assert_envelope(envelope: &JsonValue, status: &str, message: &str) {
    assert_eq!(envelope["status"], status, "envelope: {envelope}");
    assert_eq!(envelope["message"], message, "envelope: {envelope}");
}

/// A store whose every call fails as if the database were down.
pub struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn insert(&self, _: &str, _: Map<String, JsonValue>) -> roster::Result<Document> {
        Err(unreachable_error())
    }

    async fn find_all(&self, _: &str) -> roster::Result<Vec<Document>> {
        Err(unreachable_error())
    }

    async fn update_by_id(
        &self,
        _: &str,
        id: &str,
        _: Map<String, JsonValue>,
    ) -> roster::Result<Option<Document>> {
        roster::db::DocumentId::parse(id)?;
        Err(unreachable_error())
    }

    async fn delete_by_id(&self, _: &str, id: &str) -> roster::Result<Option<Document>> {
        roster::db::DocumentId::parse(id)?;
        Err(unreachable_error())
    }

    async fn ping(&self) -> roster::Result<()> {
        Err(unreachable_error())
    }

    async fn prepare(&self) -> roster::Result<()> {
        Err(unreachable_error())
    }

    fn name(&self) -> &'static str {
        "unreachable"
    }
}

fn unreachable_error() -> Error {
    Error::Database(sqlx::Error::PoolTimedOut)
}
