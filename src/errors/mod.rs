//! Error handling module for the AOI backend.
//!
//! Provides the closed set of upload faults with mapping to HTTP status codes
//! and response bodies.

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geojson::Hint;

/// Response messages shared with clients.
pub mod messages {
    pub const READ_FAILED: &str = "Internal server error reading AOI file.";
    pub const STORE_FAILED: &str = "Internal server error storing AOI file.";
    pub const NOT_JSON: &str = "Invalid AOI: File is not valid GeoJSON.";
    pub const NOT_GEOJSON: &str = "Invalid AOI: GeoJSON is not valid.";
    pub const MISSING_AOI: &str = "Invalid AOI: No area of interest file was uploaded.";
    pub const DUPLICATE_AOI: &str = "Invalid AOI: Only one area of interest file may be uploaded.";
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Transient copy could not be read back
    #[error("failed to read transient AOI file: {0}")]
    Operational(#[source] io::Error),
    /// Transient copy could not be written
    #[error("failed to store transient AOI file: {0}")]
    Storage(#[source] io::Error),
    /// Upload is not syntactically valid JSON
    #[error("AOI is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    /// Upload is JSON but not structurally valid GeoJSON
    #[error("AOI has {} GeoJSON defect(s)", .0.len())]
    Semantic(Vec<Hint>),
    /// Request shape is wrong
    #[error("{0}")]
    BadRequest(String),
    /// Request body exceeds the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Operational(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Format(_) => StatusCode::BAD_REQUEST,
            AppError::Semantic(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Get the client-facing message. Internal detail is never included.
    pub fn message(&self) -> String {
        match self {
            AppError::Operational(_) => messages::READ_FAILED.to_string(),
            AppError::Storage(_) => messages::STORE_FAILED.to_string(),
            AppError::Format(_) => messages::NOT_JSON.to_string(),
            AppError::Semantic(_) => messages::NOT_GEOJSON.to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Hint>>,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        let errors = match error {
            AppError::Semantic(hints) => Some(hints.clone()),
            _ => None,
        };

        Self {
            message: error.message(),
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
