// crates/server/src/lib.rs
//! Anki bridge server library.
//!
//! Axum HTTP server hosting the two background jobs (hint-sentence sync to
//! AnkiConnect and hint audio generation) plus their control and status
//! endpoints.

pub mod config;
pub mod error;
pub mod hint_sync;
pub mod jobs;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod voice;

pub use config::Config;
pub use error::*;
pub use metrics::init_metrics;
pub use routes::api_routes;
pub use state::{AppDeps, AppState};

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
pub fn create_app(deps: AppDeps) -> Router {
    create_app_with_state(AppState::new(deps))
}

/// Create the Axum application around an existing state.
///
/// This sets up:
/// - API routes (jobs, audio lookup, health, metrics)
/// - Static serving of generated audio under the public prefix
/// - CORS (allows any origin)
/// - Request tracing
pub fn create_app_with_state(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let audio_files = ServeDir::new(&state.audio_dir);
    let router = if state.audio_public_prefix.is_empty() {
        api_routes(Arc::clone(&state)).fallback_service(audio_files)
    } else {
        api_routes(Arc::clone(&state)).nest_service(&state.audio_public_prefix, audio_files)
    };

    router.layer(cors).layer(TraceLayer::new_for_http())
}
