//! Error types for the report API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use report_pdf::PdfReplaceError;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing required fields: {0}")]
    MissingFields(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing Authorization header")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("PDF replacement failed: {0}")]
    Pdf(#[from] PdfReplaceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingFields(_) => (StatusCode::BAD_REQUEST, "MISSING_FIELDS"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Storage(_) => (StatusCode::BAD_GATEWAY, "STORAGE_ERROR"),
            ApiError::Pdf(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PDF_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        } else {
            tracing::debug!(code, "{}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
