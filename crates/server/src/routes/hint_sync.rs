// crates/server/src/routes/hint_sync.rs
//! Hint-sentence sync routes.
//!
//! - POST   /hint-sync        - Start the bulk sync if idle
//! - GET    /hint-sync        - Current status
//! - DELETE /hint-sync        - Request a cooperative stop
//! - GET    /hint-sync/stream - SSE stream of status until idle
//! - POST   /hint-sync/note   - Sync a single note synchronously

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use anki_bridge_core::SyncedNote;
use serde::Serialize;
use serde_json::Value;

use super::jobs::{status_stream, StatusEnvelope};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for POST /api/hint-sync/note.
#[derive(Debug, Serialize)]
pub struct SyncNoteResponse {
    pub ok: bool,
    pub note: SyncedNote,
}

/// POST /api/hint-sync - Start the job (no-op if already active).
async fn start(State(state): State<Arc<AppState>>) -> Json<StatusEnvelope> {
    StatusEnvelope::json(state.hint_sync.start_if_needed())
}

/// GET /api/hint-sync - Current status.
async fn status(State(state): State<Arc<AppState>>) -> Json<StatusEnvelope> {
    StatusEnvelope::json(state.hint_sync.status())
}

/// DELETE /api/hint-sync - Request a cooperative stop.
async fn stop(State(state): State<Arc<AppState>>) -> Json<StatusEnvelope> {
    StatusEnvelope::json(state.hint_sync.request_stop())
}

/// GET /api/hint-sync/stream - SSE `status` events until the job is idle.
async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    status_stream(state.hint_sync.subscribe())
}

/// POST /api/hint-sync/note - Push the hint for one note right now.
///
/// Bypasses the bulk job entirely. The body is validated before anything
/// touches the database or AnkiConnect.
async fn sync_note(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SyncNoteResponse>> {
    let note_id = parse_note_id(&body)?;

    let item = state
        .db
        .get_hint_item_by_note(note_id)
        .await?
        .ok_or(ApiError::NoteNotLinked(note_id))?;

    let note = state.hint_sync.processor().sync_item(&item).await?;
    tracing::info!(note_id, word_id = note.word_id, "Single note synced");

    Ok(Json(SyncNoteResponse { ok: true, note }))
}

/// Extract `noteId` from a JSON body. It must be a positive integral number.
fn parse_note_id(body: &[u8]) -> Result<i64, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;
    let raw = value
        .get("noteId")
        .ok_or_else(|| ApiError::BadRequest("noteId is required".into()))?;

    let invalid = || ApiError::BadRequest(format!("noteId must be a positive integer, got {raw}"));
    let Value::Number(number) = raw else {
        return Err(invalid());
    };

    if let Some(id) = number.as_i64() {
        return if id > 0 { Ok(id) } else { Err(invalid()) };
    }
    // Whole floats such as `12.0`; anything outside i64 range or fractional is rejected.
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(invalid()),
    }
}

/// Create the hint-sync routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hint-sync", post(start).get(status).delete(stop))
        .route("/hint-sync/stream", get(stream))
        .route("/hint-sync/note", post(sync_note))
}
