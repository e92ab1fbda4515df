use crate::api::handlers::users;
use crate::state::AppState;
use axum::{
    routing::{get, patch},
    Router,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            patch(users::update_user).delete(users::delete_user),
        )
}
