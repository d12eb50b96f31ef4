use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{PersistenceError, PersistenceGateway};
use crate::models::document::{DocumentPatch, DocumentRow, NewDocument};

const COLUMNS: &str = "id, user_id, title, template, data, preview, created_at, updated_at";

/// `documents` table gateway.
#[derive(Clone)]
pub struct PgGateway {
    db: PgPool,
}

impl PgGateway {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn list_rows(&self, owner: Uuid) -> Result<Vec<DocumentRow>, PersistenceError> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM documents WHERE user_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn fetch_row(&self, owner: Uuid, id: Uuid) -> Result<DocumentRow, PersistenceError> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {COLUMNS} FROM documents WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?
        .ok_or(PersistenceError::NotFound(id))
    }

    async fn insert_row(&self, owner: Uuid, row: NewDocument) -> Result<DocumentRow, PersistenceError> {
        let inserted = sqlx::query_as::<_, DocumentRow>(&format!(
            "INSERT INTO documents (user_id, title, template, data, preview) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        ))
        .bind(owner)
        .bind(&row.title)
        .bind(&row.template)
        .bind(&row.data)
        .bind(&row.preview)
        .fetch_one(&self.db)
        .await?;

        info!("Inserted document {} for user {owner}", inserted.id);
        Ok(inserted)
    }

    async fn update_row(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<DocumentRow, PersistenceError> {
        sqlx::query_as::<_, DocumentRow>(&format!(
            "UPDATE documents SET \
               title = COALESCE($3, title), \
               data = COALESCE($4, data), \
               preview = COALESCE($5, preview), \
               updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(&patch.title)
        .bind(&patch.data)
        .bind(&patch.preview)
        .fetch_optional(&self.db)
        .await?
        .ok_or(PersistenceError::NotFound(id))
    }

    async fn delete_row(&self, owner: Uuid, id: Uuid) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(())
    }
}
