//! Domain models

pub mod user;

pub use user::{User, UserFields, USERS_COLLECTION};
