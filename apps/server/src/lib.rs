//! Roster: an HTTP service for create/read/update/delete over user records
//! kept in a document store.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod startup;
pub mod state;

pub use error::{Error, ErrorKind, Result};
