//! Request body extraction for user payloads
//!
//! Bodies may be JSON or `application/x-www-form-urlencoded`. A request with
//! no content type, any other content type or an empty body carries no fields.

use crate::{models::UserFields, Error};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde_json::{Map, Value as JsonValue};

/// Coerced user fields taken from the request body.
#[derive(Debug, Clone, Default)]
pub struct UserPayload(pub UserFields);

/// Body that could not be read or coerced.
#[derive(Debug)]
pub struct PayloadRejection(pub Error);

impl From<PayloadRejection> for Error {
    fn from(rejection: PayloadRejection) -> Self {
        rejection.0
    }
}

impl axum::response::IntoResponse for PayloadRejection {
    fn into_response(self) -> axum::response::Response {
        let (status, envelope) = crate::api::envelope::Envelope::<()>::failure(
            &self.0,
            crate::config::StatusCodeMode::Legacy,
        );
        (status, Json(envelope)).into_response()
    }
}

fn invalid(message: impl Into<String>) -> PayloadRejection {
    PayloadRejection(Error::InvalidInput(message.into()))
}

/// Media type without parameters, lowercased.
fn media_type(req: &Request) -> Option<String> {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequest<S> for UserPayload
where
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match media_type(&req).as_deref() {
            None => return Ok(Self::default()),
            Some("application/x-www-form-urlencoded") => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| invalid(e.body_text()))?;
                // Repeated keys: the last occurrence wins.
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, JsonValue::String(v)))
                    .collect::<Map<String, JsonValue>>()
            }
            Some(ct) if ct == "application/json" || ct.ends_with("+json") => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| invalid(e.body_text()))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Self::default());
                }
                let Json(value) = Json::<JsonValue>::from_bytes(&bytes)
                    .map_err(|e| invalid(e.body_text()))?;
                match value {
                    JsonValue::Object(map) => map,
                    _ => return Err(invalid("request body must be a JSON object")),
                }
            }
            Some(other) => {
                tracing::debug!(content_type = other, "Ignoring body with unsupported content type");
                return Ok(Self::default());
            }
        };

        UserFields::from_body(&body)
            .map(Self)
            .map_err(PayloadRejection)
    }
}
