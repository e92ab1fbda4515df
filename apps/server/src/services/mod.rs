//! Business logic layer
//!
//! Services orchestrate operations over the document store and apply the
//! configured record policies.

pub mod users;

pub use users::UserService;
