// crates/core/src/tts/http.rs
//! OpenAI-compatible speech provider (`POST {base}/v1/audio/speech`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::provider::SpeechProvider;
use super::types::{SpeechRequest, TtsError};

/// Speech provider for any server implementing the OpenAI speech endpoint.
#[derive(Debug, Clone)]
pub struct HttpSpeechProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

impl HttpSpeechProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            voice: voice.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/audio/speech", self.base_url)
    }
}

#[async_trait]
impl SpeechProvider for HttpSpeechProvider {
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, TtsError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let t0 = std::time::Instant::now();
        let body = SpeechBody {
            model: &self.model,
            input: text,
            voice: request.voice.as_deref().unwrap_or(&self.voice),
            response_format: "mp3",
        };

        let mut req = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            tracing::warn!(status = status.as_u16(), body = %preview, "TTS: non-success status");
            return Err(TtsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref() {
            if ct.starts_with("application/json") || ct.starts_with("text/") {
                return Err(TtsError::NotAudio(ct.to_string()));
            }
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(TtsError::EmptyAudio);
        }

        tracing::debug!(
            model = %self.model,
            bytes = bytes.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "TTS: audio received"
        );
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "openai-speech"
    }
}
