// crates/core/src/tts/provider.rs
//! SpeechProvider trait defining the interface for TTS backends.

use async_trait::async_trait;

use super::types::{SpeechRequest, TtsError};

/// Turns text into mp3 bytes.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `request.text`. Implementations must return an error rather
    /// than an empty or non-audio payload.
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError>;

    /// Provider name for logging/display (e.g. "openai-speech").
    fn name(&self) -> &str;
}
