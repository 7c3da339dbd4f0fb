// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use anki_bridge_core::AudioError;
use anki_bridge_db::DbError;
use serde::Serialize;
use thiserror::Error;

use crate::jobs::ItemError;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No word is linked to note {0}")]
    NoteNotLinked(i64),

    #[error("Sync failed: {0}")]
    SyncFailed(#[from] ItemError),

    #[error("Audio lookup failed: {0}")]
    Audio(#[from] AudioError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Bad request", msg.clone()),
                )
            }
            ApiError::NoteNotLinked(note_id) => {
                tracing::warn!(note_id, "No word linked to note");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Note not linked", self.to_string()),
                )
            }
            ApiError::SyncFailed(item_err) => {
                tracing::warn!(error = %item_err, "Single-note sync failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::with_details("Sync failed", item_err.to_string()),
                )
            }
            ApiError::Audio(audio_err) => {
                tracing::error!(error = %audio_err, "Audio lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Audio lookup failed", audio_err.to_string()),
                )
            }
            ApiError::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Database error", db_err.to_string()),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
