// crates/server/src/main.rs
//! Anki bridge server binary.
//!
//! Opens the word database, wires the AnkiConnect and speech clients into
//! the two job controllers and serves the HTTP API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anki_bridge_core::anki::AnkiConnectClient;
use anki_bridge_core::tts::HttpSpeechProvider;
use anki_bridge_db::Database;
use anki_bridge_server::config::LogFormat;
use anki_bridge_server::{create_app_with_state, init_metrics, AppDeps, AppState, Config};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const DEFAULT_LOG_FILTER: &str = "anki_bridge=info,anki_bridge_server=info,anki_bridge_db=info,tower_http=warn";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .init(),
    }
}

/// Resolves on Ctrl-C after asking both jobs to stop, so open status
/// streams end once the current items finish.
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    state.stop_jobs();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.log_format);
    init_metrics();

    let db = match &config.db_path {
        Some(path) => Database::new(path).await,
        None => Database::open_default().await,
    }
    .context("failed to open word database")?;

    let audio_dir = match &config.audio_dir {
        Some(dir) => dir.clone(),
        None => anki_bridge_core::paths::audio_dir()
            .context("could not determine a data directory for audio files")?,
    };
    tokio::fs::create_dir_all(&audio_dir)
        .await
        .with_context(|| format!("failed to create audio directory {}", audio_dir.display()))?;

    let notes = AnkiConnectClient::new(config.anki_connect_url.clone()).with_timeout(config.item_timeout());
    let speech = HttpSpeechProvider::new(&config.tts_base_url, &config.tts_model, &config.tts_voice)
        .with_api_key(config.tts_api_key.clone())
        .with_timeout(config.item_timeout());
    if config.tts_api_key.is_none() {
        tracing::warn!("TTS_API_KEY is not set; voice generation requests will be unauthenticated");
    }

    let state = AppState::new(AppDeps {
        db: db.clone(),
        notes: Arc::new(notes),
        speech: Arc::new(speech),
        audio_dir: audio_dir.clone(),
        audio_public_prefix: config.public_prefix(),
        audio_keep_per_word: usize::from(config.audio_keep_per_word),
        hint_fields: config.hint_fields(),
        run_config: config.run_config(),
    });
    let app = create_app_with_state(Arc::clone(&state));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        db = %db.db_path().display(),
        audio_dir = %audio_dir.display(),
        anki_connect = %config.anki_connect_url,
        "anki-bridge listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&state)))
        .await?;

    let grace = config.item_timeout() + SHUTDOWN_GRACE;
    if !state.wait_jobs_idle(grace).await {
        tracing::warn!(
            grace_secs = grace.as_secs(),
            "Job still running at exit; its current item is abandoned"
        );
    }
    Ok(())
}
