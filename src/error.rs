use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{draft::DraftId, protocol::ProtocolError, store::StoreError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    AuthError(String),
    Forbidden(String),
    DraftNotFoundError(DraftId),
    UnexpectedError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(e) => (StatusCode::BAD_REQUEST, format!("Bad request: {}", e)),
            Self::AuthError(e) => (
                StatusCode::UNAUTHORIZED,
                format!("Authorization error: {}", e),
            ),
            Self::Forbidden(e) => (StatusCode::FORBIDDEN, format!("Forbidden: {}", e)),
            Self::DraftNotFoundError(draft_id) => (
                StatusCode::NOT_FOUND,
                format!("Draft {} could not be found for user", draft_id),
            ),
            Self::UnexpectedError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error has occured".to_string(),
            ),
        }
        .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Self::DraftNotFoundError(id),
            StoreError::Unauthorized { id, .. } => {
                Self::Forbidden(format!("draft {} belongs to another user", id))
            }
            error => {
                tracing::error!(?error, "draft store failure");
                Self::UnexpectedError
            }
        }
    }
}

impl From<ProtocolError> for ApiError {
    fn from(error: ProtocolError) -> Self {
        Self::BadRequest(error.to_string())
    }
}
