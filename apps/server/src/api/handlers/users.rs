//! User CRUD handlers.
//!
//! Every outcome, success or failure, is rendered as an envelope.

use crate::api::envelope::{respond, Envelope};
use crate::api::extract::{PayloadRejection, UserPayload};
use crate::{models::User, state::AppState, Error, Result};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::Response,
};

pub const USER_CREATED: &str = "User created successfully";
pub const USER_UPDATED: &str = "User updated successfully";
pub const USER_DELETED: &str = "User deleted successfully";

pub async fn list_users(State(state): State<AppState>) -> Response {
    let result = state.user_service.list().await.map(Envelope::with_data);
    respond::<Vec<User>>(state.status_codes(), result)
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<UserPayload, PayloadRejection>,
) -> Response {
    respond(state.status_codes(), create(&state, payload).await)
}

pub async fn update_user(
    State(state): State<AppState>,
    id: std::result::Result<Path<String>, PathRejection>,
    payload: std::result::Result<UserPayload, PayloadRejection>,
) -> Response {
    respond(state.status_codes(), update(&state, id, payload).await)
}

pub async fn delete_user(
    State(state): State<AppState>,
    id: std::result::Result<Path<String>, PathRejection>,
) -> Response {
    respond(state.status_codes(), delete(&state, id).await)
}

/// An id segment that does not decode (e.g. invalid UTF-8) is an invalid id.
fn path_id(id: std::result::Result<Path<String>, PathRejection>) -> Result<String> {
    id.map(|Path(id)| id)
        .map_err(|rejection| Error::InvalidId(rejection.body_text()))
}

async fn create(
    state: &AppState,
    payload: std::result::Result<UserPayload, PayloadRejection>,
) -> Result<Envelope<()>> {
    let UserPayload(fields) = payload?;
    state.user_service.create(fields).await?;
    Ok(Envelope::success(USER_CREATED))
}

async fn update(
    state: &AppState,
    id: std::result::Result<Path<String>, PathRejection>,
    payload: std::result::Result<UserPayload, PayloadRejection>,
) -> Result<Envelope<()>> {
    let id = path_id(id)?;
    let UserPayload(fields) = payload?;
    state.user_service.update(&id, fields).await?;
    Ok(Envelope::success(USER_UPDATED))
}

async fn delete(
    state: &AppState,
    id: std::result::Result<Path<String>, PathRejection>,
) -> Result<Envelope<()>> {
    let id = path_id(id)?;
    state.user_service.delete(&id).await?;
    Ok(Envelope::success(USER_DELETED))
}
