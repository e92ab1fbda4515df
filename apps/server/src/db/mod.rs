//! Document store layer
//!
//! `DocumentStore` is the seam between the user service and whatever holds
//! the documents. Two implementations ship with the crate.

pub mod memory;
pub mod store;
pub mod traits;

pub use memory::InMemoryDocumentStore;
pub use store::PostgresDocumentStore;
pub use traits::{Document, DocumentId, DocumentStore};
