//! Persistence gateway. Every call is scoped to an owning user; a row that
//! belongs to someone else is indistinguishable from a missing one.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::document::{DocumentPatch, DocumentRow, NewDocument};

pub use postgres::PgGateway;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Document {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn list_rows(&self, owner: Uuid) -> Result<Vec<DocumentRow>, PersistenceError>;

    async fn fetch_row(&self, owner: Uuid, id: Uuid) -> Result<DocumentRow, PersistenceError>;

    async fn insert_row(&self, owner: Uuid, row: NewDocument) -> Result<DocumentRow, PersistenceError>;

    async fn update_row(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<DocumentRow, PersistenceError>;

    async fn delete_row(&self, owner: Uuid, id: Uuid) -> Result<(), PersistenceError>;
}
