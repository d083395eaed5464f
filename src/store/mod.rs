//! Category store module.
//!
//! Owns the catalog of categories and their posts, and keeps the
//! persisted JSON document in step with every mutation.

mod catalog;
mod category_store;
mod persistence;

pub use catalog::{Catalog, CatalogIssue, Post};
pub use category_store::CategoryStore;
pub use persistence::{CatalogPersistence, JsonFilePersistence, MemoryPersistence};

use thiserror::Error;

/// Errors returned by catalog operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Failed to access catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode catalog: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Checks whether the error came from the persistence layer rather than the request.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}
