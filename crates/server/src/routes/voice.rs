// crates/server/src/routes/voice.rs
//! Voice generation routes.
//!
//! - POST   /voice        - Start the bulk generation if idle
//! - GET    /voice        - Current status
//! - DELETE /voice        - Request a cooperative stop
//! - GET    /voice/stream - SSE stream of status until idle

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::jobs::{status_stream, StatusEnvelope};
use crate::state::AppState;

/// POST /api/voice - Start the job (no-op if already active).
async fn start(State(state): State<Arc<AppState>>) -> Json<StatusEnvelope> {
    StatusEnvelope::json(state.voice.start_if_needed())
}

/// GET /api/voice - Current status.
async fn status(State(state): State<Arc<AppState>>) -> Json<StatusEnvelope> {
    StatusEnvelope::json(state.voice.status())
}

/// DELETE /api/voice - Request a cooperative stop.
async fn stop(State(state): State<Arc<AppState>>) -> Json<StatusEnvelope> {
    StatusEnvelope::json(state.voice.request_stop())
}

async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    status_stream(state.voice.subscribe())
}

/// Create the voice routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voice", post(start).get(status).delete(stop))
        .route("/voice/stream", get(stream))
}
