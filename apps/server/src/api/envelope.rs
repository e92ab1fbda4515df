//! Uniform `{status, data?, message?}` response envelope

use crate::{config::StatusCodeMode, error::ErrorKind, Error, Result};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure kind; only present in `http` status-code mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn with_data(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Render a failure. In `legacy` mode every failure looks the same and
    /// travels with HTTP 200; in `http` mode the kind picks status and message.
    pub fn failure(error: &Error, mode: StatusCodeMode) -> (StatusCode, Self) {
        let kind = error.kind();
        if error.is_client_error() {
            tracing::debug!(kind = kind.as_str(), error = %error, "User request rejected");
        } else {
            tracing::warn!(kind = kind.as_str(), error = %error, "User operation failed");
        }

        match mode {
            StatusCodeMode::Legacy => (
                StatusCode::OK,
                Self {
                    status: EnvelopeStatus::Failed,
                    data: None,
                    message: Some(GENERIC_FAILURE_MESSAGE.to_string()),
                    error: None,
                },
            ),
            StatusCodeMode::Http => (
                status_for(kind),
                Self {
                    status: EnvelopeStatus::Failed,
                    data: None,
                    message: Some(message_for(kind).to_string()),
                    error: Some(kind),
                },
            ),
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidId | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "User not found",
        ErrorKind::InvalidId => "Invalid user id",
        ErrorKind::InvalidInput => "Invalid request body",
        ErrorKind::StoreUnavailable => "Store unavailable",
        ErrorKind::Unknown => GENERIC_FAILURE_MESSAGE,
    }
}

/// Turn an operation outcome into the HTTP response.
pub fn respond<T: Serialize>(mode: StatusCodeMode, result: Result<Envelope<T>>) -> Response {
    match result {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => {
            let (status, envelope) = Envelope::<T>::failure(&error, mode);
            (status, Json(envelope)).into_response()
        }
    }
}
