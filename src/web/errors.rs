use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

/// Application error type for web handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Validation(String),
    Unauthorized,
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(id) => AppError::NotFound(format!("task not found: {id}")),
            Error::Validation(msg) => AppError::Validation(msg),
            Error::Unauthorized => AppError::Unauthorized,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "not signed in".to_string()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, message).into_response()
    }
}
