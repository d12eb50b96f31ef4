use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{EditOutcome, EditPayload, EditorSession, SessionSnapshot, ViewMode};
use crate::documents::handlers::PreviewResponse;
use crate::errors::AppError;
use crate::extraction::UploadedFile;
use crate::models::document::DocumentPatch;
use crate::render::{RenderedForm, UiSchemaNode};
use crate::routes::current_user::CurrentUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EditRequest {
    pub view: ViewMode,
    pub payload: EditPayload,
}

#[derive(Serialize)]
pub struct EditResponse {
    pub outcome: EditOutcome,
    pub session: SessionSnapshot,
}

#[derive(Deserialize)]
pub struct ViewRequest {
    pub view: ViewMode,
}

#[derive(Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// POST /api/v1/documents/:id/sessions
pub async fn handle_open(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(document_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let row = state.gateway.fetch_row(user, document_id).await?;
    let session = EditorSession::open(Uuid::new_v4(), row)?;
    let snapshot = session.snapshot();
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/v1/sessions/:sid
pub async fn handle_get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let snapshot = handle.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// DELETE /api/v1/sessions/:sid
pub async fn handle_close(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(user, sid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:sid/edits
pub async fn handle_edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let mut session = handle.lock().await;
    let outcome = session.edit(req.view, req.payload)?;
    Ok(Json(EditResponse {
        outcome,
        session: session.snapshot(),
    }))
}

/// PUT /api/v1/sessions/:sid/view
pub async fn handle_set_view(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
    Json(req): Json<ViewRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let mut session = handle.lock().await;
    session.set_view(req.view);
    Ok(Json(session.snapshot()))
}

/// POST /api/v1/sessions/:sid/save
///
/// The session lock is released while the write is in flight, so edits made
/// during the save land on a newer revision and leave the session dirty.
pub async fn handle_save(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let (ticket, document_id) = {
        let mut session = handle.lock().await;
        (session.begin_save()?, session.document_id())
    };

    let patch = DocumentPatch::body(ticket.data.clone(), ticket.preview.clone());
    let result = state.gateway.update_row(user, document_id, patch).await;

    let mut session = handle.lock().await;
    session.complete_save(&ticket, result)?;
    Ok(Json(session.snapshot()))
}

/// PATCH /api/v1/sessions/:sid/title
///
/// Like a body save, the title write happens outside the session lock.
pub async fn handle_rename(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".into()));
    }
    let handle = state.sessions.get(user, sid).await?;
    let document_id = {
        let mut session = handle.lock().await;
        session.rename(title.clone());
        session.document_id()
    };

    let result = state
        .gateway
        .update_row(user, document_id, DocumentPatch::title(title.clone()))
        .await;

    let mut session = handle.lock().await;
    session.complete_title_save(&title, result)?;
    Ok(Json(session.snapshot()))
}

/// GET /api/v1/sessions/:sid/form
pub async fn handle_get_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
) -> Result<Json<RenderedForm>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let form = handle.lock().await.render_form();
    Ok(Json(form))
}

/// POST /api/v1/sessions/:sid/form
///
/// Installs an explicit UI schema for the session and renders with it.
pub async fn handle_set_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
    Json(ui): Json<UiSchemaNode>,
) -> Result<Json<RenderedForm>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let mut session = handle.lock().await;
    session.set_ui_schema(Some(ui));
    Ok(Json(session.render_form()))
}

/// GET /api/v1/sessions/:sid/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
) -> Result<Json<PreviewResponse>, AppError> {
    let handle = state.sessions.get(user, sid).await?;
    let preview = handle.lock().await.preview();
    let markdown = preview.to_markdown();
    Ok(Json(PreviewResponse { preview, markdown }))
}

/// POST /api/v1/sessions/:sid/upload
///
/// Multipart form with a `file` part. The extracted candidate goes through
/// the same intake as any other edit, from the upload view.
pub async fn handle_upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sid): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<EditResponse>, AppError> {
    let handle = state.sessions.get(user, sid).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        upload = Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    let file = upload.ok_or_else(|| AppError::Validation("No file uploaded".into()))?;
    info!(
        "Session {sid}: extracting upload {:?} ({} bytes)",
        file.file_name,
        file.bytes.len()
    );

    let candidate = state.extractor.extract(file).await?;

    let mut session = handle.lock().await;
    session.set_view(ViewMode::Upload);
    let outcome = session.edit(ViewMode::Upload, EditPayload::Object { value: candidate })?;
    Ok(Json(EditResponse {
        outcome,
        session: session.snapshot(),
    }))
}
