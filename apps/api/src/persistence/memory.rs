use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PersistenceError, PersistenceGateway};
use crate::models::document::{DocumentPatch, DocumentRow, NewDocument};

/// Test double for the `documents` table. `fail_writes` makes every insert
/// and update fail, for exercising save-failure paths.
#[derive(Default)]
pub struct MemoryGateway {
    rows: RwLock<HashMap<Uuid, DocumentRow>>,
    fail_writes: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("write rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn list_rows(&self, owner: Uuid) -> Result<Vec<DocumentRow>, PersistenceError> {
        let mut rows: Vec<DocumentRow> = self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn fetch_row(&self, owner: Uuid, id: Uuid) -> Result<DocumentRow, PersistenceError> {
        self.rows
            .read()
            .await
            .get(&id)
            .filter(|r| r.user_id == owner)
            .cloned()
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn insert_row(&self, owner: Uuid, row: NewDocument) -> Result<DocumentRow, PersistenceError> {
        self.check_writable()?;
        let now = Utc::now();
        let stored = DocumentRow {
            id: Uuid::new_v4(),
            user_id: owner,
            title: row.title,
            template: row.template,
            data: row.data,
            preview: row.preview,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_row(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: DocumentPatch,
    ) -> Result<DocumentRow, PersistenceError> {
        self.check_writable()?;
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(&id)
            .filter(|r| r.user_id == owner)
            .ok_or(PersistenceError::NotFound(id))?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(data) = patch.data {
            row.data = data;
        }
        if let Some(preview) = patch.preview {
            row.preview = Some(preview);
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_row(&self, owner: Uuid, id: Uuid) -> Result<(), PersistenceError> {
        let mut rows = self.rows.write().await;
        if !rows.get(&id).is_some_and(|r| r.user_id == owner) {
            return Err(PersistenceError::NotFound(id));
        }
        rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_doc() -> NewDocument {
        NewDocument {
            title: "CV".into(),
            template: "default".into(),
            data: json!({"basics": {"name": "A"}}),
            preview: None,
        }
    }

    #[tokio::test]
    async fn test_rows_are_owner_scoped() {
        let gw = MemoryGateway::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let row = gw.insert_row(alice, new_doc()).await.unwrap();

        assert!(gw.fetch_row(alice, row.id).await.is_ok());
        assert!(matches!(
            gw.fetch_row(bob, row.id).await,
            Err(PersistenceError::NotFound(_))
        ));
        assert!(gw.delete_row(bob, row.id).await.is_err());
        assert!(gw.list_rows(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patch_only_touches_given_columns() {
        let gw = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let row = gw.insert_row(owner, new_doc()).await.unwrap();
        let updated = gw
            .update_row(owner, row.id, DocumentPatch::title("Renamed"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.data, row.data);
    }
}
