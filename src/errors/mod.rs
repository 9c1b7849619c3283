use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error taxonomy.
///
/// Validation and not-found messages are shown to the caller verbatim;
/// authorization failures collapse to a uniform 401 regardless of which
/// check failed; infrastructure errors are reduced to a generic body and
/// logged server-side in full.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error naming the missing required field
    pub fn missing_field(field: &str) -> Self {
        AppError::Validation(format!("{field} is required"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::Io(e) => {
                log::error!("I/O failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong".to_string())
            }
            AppError::Storage(e) => {
                log::error!("Storage failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong".to_string())
            }
            AppError::Internal(e) => {
                log::error!("Internal failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "something went wrong".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
