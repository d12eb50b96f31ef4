use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::actions;
use crate::convert::RawInput;
use crate::errors::AppError;
use crate::models::document::{DocumentRow, DocumentSummary};
use crate::preview::Preview;
use crate::routes::current_user::CurrentUser;
use crate::schema::json_schema;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct CreateRequest {
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
}

#[derive(Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub preview: Preview,
    pub markdown: String,
}

/// GET /api/v1/schema
pub async fn handle_schema() -> Json<Value> {
    Json(json_schema().clone())
}

/// GET /api/v1/documents
pub async fn handle_list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    Ok(Json(actions::list(state.gateway.as_ref(), user).await?))
}

/// POST /api/v1/documents
pub async fn handle_create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Option<Json<CreateRequest>>,
) -> Result<(StatusCode, Json<DocumentRow>), AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let row = actions::create(state.gateway.as_ref(), user, req.doc_type.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/documents/:id
pub async fn handle_get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentRow>, AppError> {
    Ok(Json(actions::get(state.gateway.as_ref(), user, id).await?))
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    actions::delete(state.gateway.as_ref(), user, id).await?;
    state.sessions.close_document(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/:id/clone
pub async fn handle_clone(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<DocumentRow>), AppError> {
    let row = actions::clone_document(state.gateway.as_ref(), user, id).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/documents/:id/title
pub async fn handle_rename(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<TitleRequest>,
) -> Result<Json<DocumentRow>, AppError> {
    Ok(Json(
        actions::rename(state.gateway.as_ref(), user, id, &req.title).await?,
    ))
}

/// PUT /api/v1/documents/:id/data
pub async fn handle_replace_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<RawInput>,
) -> Result<Json<DocumentRow>, AppError> {
    Ok(Json(
        actions::replace_data(state.gateway.as_ref(), user, id, input).await?,
    ))
}

/// GET /api/v1/documents/:id/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PreviewResponse>, AppError> {
    let preview = actions::preview(state.gateway.as_ref(), user, id).await?;
    let markdown = preview.to_markdown();
    Ok(Json(PreviewResponse { preview, markdown }))
}
