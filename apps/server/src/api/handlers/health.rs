//! Liveness endpoints.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "All good!" }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub backend: &'static str,
}

/// Reports whether the document store answers a ping.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.store.name();
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: "up",
                backend,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, backend, "Health check: store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    store: "down",
                    backend,
                }),
            )
        }
    }
}
