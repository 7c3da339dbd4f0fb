// crates/core/src/tts/mod.rs
//! Text-to-speech integration for hint audio.
//!
//! Provides the `SpeechProvider` trait and an implementation for
//! OpenAI-compatible `/v1/audio/speech` endpoints.

pub mod http;
pub mod provider;
pub mod types;

pub use http::HttpSpeechProvider;
pub use provider::SpeechProvider;
pub use types::{SpeechRequest, TtsError};
