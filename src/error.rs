//! Shared API error taxonomy
//!
//! Every handler returns these kinds. Storage failures are logged with
//! their driver detail server-side and surface to the client as a generic
//! message only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    /// Duplicate active assignment. Resolved internally by reactivation;
    /// surfaces only if that path is bypassed.
    #[error("Conflict")]
    Conflict,

    #[error("Storage error")]
    Storage(#[from] sqlx::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Machine-stable discriminator included in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotAuthenticated => "not_authenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound => "not_found",
            ApiError::Conflict => "conflict",
            ApiError::Storage(_) => "storage_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Never leak driver detail.
            ApiError::Storage(_) => "A storage error occurred. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<crate::validation::ValidationError> for ApiError {
    fn from(e: crate::validation::ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(ref e) = self {
            tracing::error!("Storage error: {}", e);
        }
        let body = json!({
            "success": false,
            "error": self.client_message(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ApiError::NotAuthenticated.kind(), "not_authenticated");
        assert_eq!(ApiError::validation("x").kind(), "validation_error");
        assert_eq!(ApiError::Storage(sqlx::Error::RowNotFound).kind(), "storage_error");
    }

    #[test]
    fn storage_detail_is_not_client_visible() {
        let e = ApiError::Storage(sqlx::Error::PoolTimedOut);
        assert!(!e.client_message().to_lowercase().contains("pool"));
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::NotAuthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
    }
}
