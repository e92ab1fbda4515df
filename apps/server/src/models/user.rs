//! User record and the coercion of raw request values into its fields

use crate::{db::Document, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const PHONE: &str = "phone";

/// A stored user as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<i64>,
}

impl TryFrom<Document> for User {
    type Error = Error;

    fn try_from(document: Document) -> Result<Self> {
        let fields = UserFields::from_body(&document.body)?;
        Ok(Self {
            id: document.id.to_string(),
            first_name: fields.first_name.flatten(),
            last_name: fields.last_name.flatten(),
            phone: fields.phone.flatten(),
        })
    }
}

/// Field values supplied by a caller.
///
/// The outer `Option` records whether the key was present in the request at
/// all; the inner one whether it carried a value (`null`, an empty phone
/// string) or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub phone: Option<Option<i64>>,
}

impl UserFields {
    /// Coerce a raw JSON object (or decoded form) into typed fields.
    /// Unknown keys are ignored.
    pub fn from_body(body: &Map<String, JsonValue>) -> Result<Self> {
        Ok(Self {
            first_name: body
                .get(FIRST_NAME)
                .map(|v| coerce_text(FIRST_NAME, v))
                .transpose()?,
            last_name: body
                .get(LAST_NAME)
                .map(|v| coerce_text(LAST_NAME, v))
                .transpose()?,
            phone: body.get(PHONE).map(coerce_phone).transpose()?,
        })
    }

    /// Document body for an insert. Absent fields are left out.
    pub fn to_document(&self) -> Map<String, JsonValue> {
        let mut body = Map::new();
        if let Some(Some(first_name)) = &self.first_name {
            body.insert(FIRST_NAME.to_string(), JsonValue::from(first_name.clone()));
        }
        if let Some(Some(last_name)) = &self.last_name {
            body.insert(LAST_NAME.to_string(), JsonValue::from(last_name.clone()));
        }
        if let Some(Some(phone)) = self.phone {
            body.insert(PHONE.to_string(), JsonValue::from(phone));
        }
        body
    }

    /// Changes that overwrite every field. Fields not supplied become `null`,
    /// which the store treats as removal.
    pub fn to_replacement(&self) -> Map<String, JsonValue> {
        let mut changes = Map::new();
        changes.insert(
            FIRST_NAME.to_string(),
            text_or_null(self.first_name.as_ref().and_then(|v| v.as_deref())),
        );
        changes.insert(
            LAST_NAME.to_string(),
            text_or_null(self.last_name.as_ref().and_then(|v| v.as_deref())),
        );
        changes.insert(
            PHONE.to_string(),
            self.phone.flatten().map_or(JsonValue::Null, JsonValue::from),
        );
        changes
    }

    /// Changes that only touch supplied fields.
    pub fn to_merge(&self) -> Map<String, JsonValue> {
        let mut changes = Map::new();
        if let Some(first_name) = &self.first_name {
            changes.insert(FIRST_NAME.to_string(), text_or_null(first_name.as_deref()));
        }
        if let Some(last_name) = &self.last_name {
            changes.insert(LAST_NAME.to_string(), text_or_null(last_name.as_deref()));
        }
        if let Some(phone) = self.phone {
            changes.insert(
                PHONE.to_string(),
                phone.map_or(JsonValue::Null, JsonValue::from),
            );
        }
        changes
    }
}

fn text_or_null(value: Option<&str>) -> JsonValue {
    value.map_or(JsonValue::Null, JsonValue::from)
}

fn coerce_text(field: &str, value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::InvalidInput(format!(
            "{field} must be a string"
        ))),
    }
}

fn coerce_phone(value: &JsonValue) -> Result<Option<i64>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(b) => Ok(Some(i64::from(*b))),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            n.as_f64()
                .and_then(integral_f64)
                .map(Some)
                .ok_or_else(|| invalid_phone(&n.to_string()))
        }
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Some(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(integral_f64)
                .map(Some)
                .ok_or_else(|| invalid_phone(trimmed))
        }
        JsonValue::Array(_) | JsonValue::Object(_) => Err(invalid_phone("non-scalar value")),
    }
}

fn integral_f64(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn invalid_phone(raw: &str) -> Error {
    Error::InvalidInput(format!("phone must be an integer, got {raw}"))
}
