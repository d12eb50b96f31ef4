use tracing::info;
use uuid::Uuid;

use crate::convert::{self, RawInput};
use crate::document::{default_resume, Resume};
use crate::errors::AppError;
use crate::models::document::{DocumentPatch, DocumentRow, DocumentSummary, NewDocument};
use crate::persistence::PersistenceGateway;
use crate::preview::Preview;
use crate::validation::validate_candidate;

pub const DEFAULT_DOCUMENT_TYPE: &str = "Resume";
pub const DEFAULT_TEMPLATE: &str = "default";

fn preview_markdown(doc: &Resume) -> String {
    Preview::from_document(doc).to_markdown()
}

pub async fn list(gateway: &dyn PersistenceGateway, owner: Uuid) -> Result<Vec<DocumentSummary>, AppError> {
    let rows = gateway.list_rows(owner).await?;
    Ok(rows.iter().map(DocumentSummary::from).collect())
}

/// New row seeded with the sample résumé, titled `Untitled <type>`.
pub async fn create(
    gateway: &dyn PersistenceGateway,
    owner: Uuid,
    doc_type: Option<&str>,
) -> Result<DocumentRow, AppError> {
    let doc_type = doc_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_TYPE);
    let seed = default_resume();
    let row = gateway
        .insert_row(
            owner,
            NewDocument {
                title: format!("Untitled {doc_type}"),
                template: DEFAULT_TEMPLATE.to_string(),
                data: convert::document_to_value(&seed)?,
                preview: Some(preview_markdown(&seed)),
            },
        )
        .await?;
    info!("Created document {} for user {owner}", row.id);
    Ok(row)
}

pub async fn get(gateway: &dyn PersistenceGateway, owner: Uuid, id: Uuid) -> Result<DocumentRow, AppError> {
    Ok(gateway.fetch_row(owner, id).await?)
}

pub async fn delete(gateway: &dyn PersistenceGateway, owner: Uuid, id: Uuid) -> Result<(), AppError> {
    gateway.delete_row(owner, id).await?;
    info!("Deleted document {id} for user {owner}");
    Ok(())
}

/// Copies data, template and preview into a new row owned by `owner`.
pub async fn clone_document(
    gateway: &dyn PersistenceGateway,
    owner: Uuid,
    id: Uuid,
) -> Result<DocumentRow, AppError> {
    let original = gateway.fetch_row(owner, id).await?;
    let copy = gateway
        .insert_row(
            owner,
            NewDocument {
                title: format!("{} (Copy)", original.title),
                template: original.template,
                data: original.data,
                preview: original.preview,
            },
        )
        .await?;
    info!("Cloned document {id} into {}", copy.id);
    Ok(copy)
}

pub async fn rename(
    gateway: &dyn PersistenceGateway,
    owner: Uuid,
    id: Uuid,
    title: &str,
) -> Result<DocumentRow, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".into()));
    }
    Ok(gateway.update_row(owner, id, DocumentPatch::title(title)).await?)
}

/// Parse, validate and persist a whole document body in one step. Nothing
/// is written unless the input is valid.
pub async fn replace_data(
    gateway: &dyn PersistenceGateway,
    owner: Uuid,
    id: Uuid,
    input: RawInput,
) -> Result<DocumentRow, AppError> {
    let candidate = convert::parse_input(input).map_err(|e| AppError::Validation(e.to_string()))?;
    let validation = validate_candidate(&candidate);
    if !validation.is_valid() {
        return Err(AppError::schema(validation.errors().to_vec()));
    }
    let doc = convert::candidate_to_document(candidate)?;
    let patch = DocumentPatch::body(convert::document_to_value(&doc)?, preview_markdown(&doc));
    Ok(gateway.update_row(owner, id, patch).await?)
}

pub async fn preview(gateway: &dyn PersistenceGateway, owner: Uuid, id: Uuid) -> Result<Preview, AppError> {
    let row = gateway.fetch_row(owner, id).await?;
    let doc = convert::candidate_to_document(row.data)?;
    Ok(Preview::from_document(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::memory::MemoryGateway;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_seeds_sample_document() {
        let gw = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let row = create(&gw, owner, None).await.unwrap();
        assert_eq!(row.title, "Untitled Resume");
        assert_eq!(row.template, "default");
        assert!(validate_candidate(&row.data).is_valid());
        assert!(row.preview.is_some());

        let cover = create(&gw, owner, Some("Cover Letter")).await.unwrap();
        assert_eq!(cover.title, "Untitled Cover Letter");
        assert_eq!(list(&gw, owner).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clone_copies_body_under_new_title() {
        let gw = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let original = create(&gw, owner, None).await.unwrap();
        let copy = clone_document(&gw, owner, original.id).await.unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.title, "Untitled Resume (Copy)");
        assert_eq!(copy.data, original.data);
        assert_eq!(copy.preview, original.preview);
    }

    #[tokio::test]
    async fn test_clone_of_foreign_document_is_not_found() {
        let gw = MemoryGateway::new();
        let original = create(&gw, Uuid::new_v4(), None).await.unwrap();
        let err = clone_document(&gw, Uuid::new_v4(), original.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replace_data_validates_before_writing() {
        let gw = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let row = create(&gw, owner, None).await.unwrap();

        let err = replace_data(&gw, owner, row.id, RawInput::Yaml("basics:\n  label: x\n".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Schema { ref message, .. } if message == "basics.name: Required"));
        assert_eq!(get(&gw, owner, row.id).await.unwrap().data, row.data);

        let err = replace_data(&gw, owner, row.id, RawInput::Json("{".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.starts_with("Invalid JSON format")));

        let updated = replace_data(
            &gw,
            owner,
            row.id,
            RawInput::Object(json!({"basics": {"name": "Ada"}})),
        )
        .await
        .unwrap();
        assert_eq!(updated.data, json!({"basics": {"name": "Ada"}}));
        assert!(updated.preview.unwrap().starts_with("# Ada"));
    }

    #[tokio::test]
    async fn test_rename_rejects_blank_title() {
        let gw = MemoryGateway::new();
        let owner = Uuid::new_v4();
        let row = create(&gw, owner, None).await.unwrap();
        assert!(matches!(
            rename(&gw, owner, row.id, "  ").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(rename(&gw, owner, row.id, "CV 2026").await.unwrap().title, "CV 2026");
    }
}
