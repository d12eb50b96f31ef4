pub mod current_user;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::documents::handlers as documents;
use crate::session::handlers as sessions;
use crate::state::AppState;

/// Room for multipart boundaries and headers around the file part.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/schema", get(documents::handle_schema))
        // Documents
        .route(
            "/api/v1/documents",
            get(documents::handle_list).post(documents::handle_create),
        )
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get).delete(documents::handle_delete),
        )
        .route("/api/v1/documents/:id/clone", post(documents::handle_clone))
        .route("/api/v1/documents/:id/title", patch(documents::handle_rename))
        .route("/api/v1/documents/:id/data", put(documents::handle_replace_data))
        .route("/api/v1/documents/:id/preview", get(documents::handle_preview))
        // Editor sessions
        .route("/api/v1/documents/:id/sessions", post(sessions::handle_open))
        .route(
            "/api/v1/sessions/:sid",
            get(sessions::handle_get).delete(sessions::handle_close),
        )
        .route("/api/v1/sessions/:sid/edits", post(sessions::handle_edit))
        .route("/api/v1/sessions/:sid/view", put(sessions::handle_set_view))
        .route("/api/v1/sessions/:sid/save", post(sessions::handle_save))
        .route("/api/v1/sessions/:sid/title", patch(sessions::handle_rename))
        .route(
            "/api/v1/sessions/:sid/form",
            get(sessions::handle_get_form).post(sessions::handle_set_form),
        )
        .route("/api/v1/sessions/:sid/preview", get(sessions::handle_preview))
        .route(
            "/api/v1/sessions/:sid/upload",
            post(sessions::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
