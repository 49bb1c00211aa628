use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::errors::TrackerError;

/// Handler-level error: domain errors plus the HTTP-only unauthorized case.
///
/// Implements [`IntoResponse`] so every endpoint produces the same JSON
/// error body. Store failures are logged here and surface as a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Convenience alias for handler return values
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Tracker(err) => match err {
                TrackerError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                TrackerError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                TrackerError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                TrackerError::Persistence(db_err) => {
                    tracing::error!(error = %db_err, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "an internal error occurred".to_string(),
                    )
                }
            },
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
