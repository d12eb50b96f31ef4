use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the `documents` table. `data` is the résumé as stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template: String,
    pub data: Value,
    pub preview: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection; the document body is left out.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub template: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&DocumentRow> for DocumentSummary {
    fn from(row: &DocumentRow) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            template: row.template.clone(),
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub template: String,
    pub data: Value,
    pub preview: Option<String>,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub data: Option<Value>,
    pub preview: Option<String>,
}

impl DocumentPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn body(data: Value, preview: String) -> Self {
        Self {
            data: Some(data),
            preview: Some(preview),
            ..Default::default()
        }
    }
}
