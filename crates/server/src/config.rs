// crates/server/src/config.rs
//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use anki_bridge_core::anki::client::DEFAULT_ANKI_CONNECT_URL;
use clap::{Parser, ValueEnum};

use crate::hint_sync::HintFields;
use crate::jobs::RunConfig;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 47893;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Anki bridge server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "anki-bridge", version, about = "Background hint-sync and voice jobs for an Anki vocabulary deck")]
pub struct Config {
    /// Port to listen on (bound to 127.0.0.1)
    #[arg(long, env = "ANKI_BRIDGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// SQLite database path (defaults to the platform data dir)
    #[arg(long, env = "ANKI_BRIDGE_DB")]
    pub db_path: Option<PathBuf>,

    /// Directory generated audio is written to and served from
    #[arg(long, env = "ANKI_BRIDGE_AUDIO_DIR")]
    pub audio_dir: Option<PathBuf>,

    /// URL prefix under which audio files are served
    #[arg(long, env = "AUDIO_PUBLIC_PREFIX", default_value = "/audio")]
    pub audio_public_prefix: String,

    /// Audio files kept per word after a new one is generated (minimum 1)
    #[arg(long, env = "AUDIO_KEEP_PER_WORD", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub audio_keep_per_word: u16,

    /// AnkiConnect endpoint
    #[arg(long, env = "ANKI_CONNECT_URL", default_value = DEFAULT_ANKI_CONNECT_URL)]
    pub anki_connect_url: String,

    /// Note field receiving the hint sentence
    #[arg(long, env = "ANKI_HINT_FIELD", default_value = "Hint")]
    pub hint_field: String,

    /// Note field receiving the hint translation
    #[arg(long, env = "ANKI_HINT_TRANSLATION_FIELD", default_value = "HintTranslation")]
    pub hint_translation_field: String,

    /// Base URL of an OpenAI-compatible speech API
    #[arg(long, env = "TTS_BASE_URL", default_value = "https://api.openai.com")]
    pub tts_base_url: String,

    /// Bearer token for the speech API
    #[arg(long, env = "TTS_API_KEY", hide_env_values = true)]
    pub tts_api_key: Option<String>,

    /// Speech model
    #[arg(long, env = "TTS_MODEL", default_value = "tts-1")]
    pub tts_model: String,

    /// Speech voice
    #[arg(long, env = "TTS_VOICE", default_value = "alloy")]
    pub tts_voice: String,

    /// Rows fetched per batch by the job run loops
    #[arg(long, env = "JOB_BATCH_SIZE", default_value_t = 25, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub job_batch_size: u32,

    /// Time limit for processing one item, in seconds
    #[arg(long, env = "JOB_ITEM_TIMEOUT_SECS", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub job_item_timeout_secs: u64,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            batch_size: self.job_batch_size,
            item_timeout: self.item_timeout(),
        }
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.job_item_timeout_secs)
    }

    pub fn hint_fields(&self) -> HintFields {
        HintFields {
            sentence: self.hint_field.clone(),
            translation: self.hint_translation_field.clone(),
        }
    }

    /// Public URL prefix without a trailing slash.
    pub fn public_prefix(&self) -> String {
        normalize_prefix(&self.audio_public_prefix)
    }
}

/// `"audio/"` and `"/audio"` both become `"/audio"`; empty becomes `""`.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
