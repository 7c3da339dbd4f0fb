// crates/core/src/tts/types.rs
//! Request/error types for text-to-speech.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text to speak, with an optional voice override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
        }
    }
}

/// Errors that can occur during speech synthesis.
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("TTS request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("TTS returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("TTS returned empty audio")]
    EmptyAudio,

    #[error("TTS returned non-audio content: {0}")]
    NotAudio(String),

    #[error("Nothing to synthesize")]
    EmptyText,
}
