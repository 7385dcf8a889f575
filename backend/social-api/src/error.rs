/// Error types for the social API
///
/// Every failure leaves the service as a JSON body of the form
/// `{"message": "..."}` with a 4xx or 5xx status.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Store failure: {0}")]
    StoreFailure(StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Store failure reported with a route-specific status (see [`StoreFailureStatus`]).
    #[error("{source}")]
    WithStatus {
        status: StatusCode,
        #[source]
        source: Box<AppError>,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WithStatus { status, .. } => *status,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() || matches!(self, AppError::WithStatus { .. }) {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse {
            message: self.to_string(),
        })
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::Conflict(format!("{} already exists", what)),
            other => AppError::StoreFailure(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized("Invalid or expired token".to_string())
    }
}

/// Lets a route decide which status a store failure is reported with.
///
/// Some routes historically answered store failures with 404 or 409 rather
/// than a 5xx, and clients depend on those codes.
pub trait StoreFailureStatus<T> {
    fn store_failure_status(self, status: StatusCode) -> Result<T>;
}

impl<T> StoreFailureStatus<T> for Result<T> {
    fn store_failure_status(self, status: StatusCode) -> Result<T> {
        self.map_err(|err| match err {
            AppError::StoreFailure(_) => AppError::WithStatus {
                status,
                source: Box::new(err),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use resilience::TimeoutError;
    use std::time::Duration;

    fn store_failure() -> AppError {
        AppError::from(StoreError::Timeout(TimeoutError::Elapsed(
            Duration::from_millis(5),
        )))
    }

    #[actix_web::test]
    async fn test_error_body_is_message_only() {
        let resp = AppError::NotFound("Post not found".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Post not found" }));
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = AppError::from(StoreError::Duplicate("Email".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[test]
    fn test_store_failure_status_override() {
        let result: Result<()> = Err(store_failure());
        let err = result
            .store_failure_status(StatusCode::NOT_FOUND)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_string().starts_with("Store failure"));
    }

    #[test]
    fn test_store_failure_status_leaves_other_errors() {
        let result: Result<()> = Err(AppError::Validation("bad".into()));
        let err = result
            .store_failure_status(StatusCode::NOT_FOUND)
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unoverridden_store_failure_is_unavailable() {
        assert_eq!(
            store_failure().status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
