use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

/// Header the upstream auth layer sets to the authenticated user's id.
pub const USER_HEADER: &str = "x-user-id";

/// The authenticated caller. Missing or malformed identity is a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        Uuid::parse_str(raw.trim())
            .map(CurrentUser)
            .map_err(|_| AppError::Unauthorized)
    }
}
