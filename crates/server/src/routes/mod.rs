//! API route handlers for the anki-bridge server.

pub mod audio;
pub mod health;
pub mod hint_sync;
pub mod jobs;
pub mod metrics;
pub mod voice;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router with all routes.
///
/// Routes:
/// - GET    /api/health            - Health check
/// - POST   /api/hint-sync         - Start hint-sentence sync
/// - GET    /api/hint-sync         - Hint-sync status
/// - DELETE /api/hint-sync         - Stop hint-sync
/// - GET    /api/hint-sync/stream  - SSE stream of hint-sync status
/// - POST   /api/hint-sync/note    - Sync one note synchronously
/// - POST   /api/voice             - Start voice generation
/// - GET    /api/voice             - Voice status
/// - DELETE /api/voice             - Stop voice generation
/// - GET    /api/voice/stream      - SSE stream of voice status
/// - GET    /api/audio/latest      - Newest audio file for a word
/// - GET    /metrics               - Prometheus metrics
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", hint_sync::router())
        .nest("/api", voice::router())
        .nest("/api", audio::router())
        .merge(metrics::router())
        .with_state(state)
}
