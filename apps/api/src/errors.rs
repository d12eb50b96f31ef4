use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::convert::ConvertError;
use crate::extraction::ExtractionError;
use crate::persistence::PersistenceError;
use crate::session::{SessionError, StoreError};
use crate::validation::FieldError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The candidate parsed but failed the schema; `errors` is path-keyed.
    #[error("{message}")]
    Schema {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),

    #[error("Extraction service error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn schema(errors: Vec<FieldError>) -> Self {
        AppError::Schema {
            message: crate::validation::format_errors(&errors),
            errors,
        }
    }
}

impl From<PersistenceError> for AppError {
    fn from(e: PersistenceError) -> Self {
        match e {
            PersistenceError::NotFound(id) => AppError::NotFound(format!("Document {id} not found")),
            other => AppError::Persistence(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound(e.to_string()),
            StoreError::Forbidden(_) => AppError::Forbidden,
        }
    }
}

impl From<ConvertError> for AppError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::Syntax(syntax) => AppError::Validation(syntax.to_string()),
            ConvertError::Shape(msg) => AppError::UnprocessableEntity(msg),
            ConvertError::Encode(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::ReadOnlyView
            | SessionError::PayloadMismatch { .. }
            | SessionError::NoControl(_)
            | SessionError::Array(_) => AppError::Validation(e.to_string()),
            SessionError::InvalidStoredDocument(_) => AppError::UnprocessableEntity(e.to_string()),
            SessionError::NothingToSave(_)
            | SessionError::SaveInFlight
            | SessionError::StaleTicket(_) => AppError::Conflict(e.to_string()),
            SessionError::Convert(inner) => inner.into(),
            SessionError::Persistence(inner) => inner.into(),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::UnsupportedFormat => AppError::UnsupportedMediaType(e.to_string()),
            ExtractionError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            ExtractionError::Empty | ExtractionError::NoText | ExtractionError::Unreadable(_) => {
                AppError::Validation(e.to_string())
            }
            ExtractionError::SchemaMismatch(errors) => AppError::schema(errors),
            ExtractionError::Service(inner) => AppError::Upstream(inner.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Schema { message, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR", message.clone())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_ERROR",
                    "The document could not be saved or loaded; please retry".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Extraction service error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_ERROR",
                    "The upload could not be processed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::Schema { errors, .. } = &self {
            error["errors"] = json!(errors);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_persistence_not_found_maps_to_404() {
        let err: AppError = PersistenceError::NotFound(Uuid::nil()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err: AppError = PersistenceError::Unavailable("down".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_session_errors_map_to_client_statuses() {
        let err: AppError = SessionError::ReadOnlyView.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err: AppError = SessionError::SaveInFlight.into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_extraction_errors_map_to_statuses() {
        let err: AppError = ExtractionError::UnsupportedFormat.into();
        assert_eq!(err.into_response().status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let err: AppError = ExtractionError::TooLarge { size: 2, limit: 1 }.into();
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
