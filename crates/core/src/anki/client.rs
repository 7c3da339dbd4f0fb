// crates/core/src/anki/client.rs
//! AnkiConnect client - JSON-RPC over HTTP to the AnkiConnect add-on.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::service::NoteService;
use super::types::{AnkiError, AnkiRequest, AnkiResponse, NoteInfo, ANKI_CONNECT_VERSION};

/// Default AnkiConnect listen address.
pub const DEFAULT_ANKI_CONNECT_URL: &str = "http://127.0.0.1:8765";

/// `NoteService` backed by a running AnkiConnect add-on.
#[derive(Debug, Clone)]
pub struct AnkiConnectClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl AnkiConnectClient {
    /// Create a client for the AnkiConnect endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn invoke<P, T>(&self, action: &str, params: P) -> Result<Option<T>, AnkiError>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let t0 = std::time::Instant::now();
        let request = AnkiRequest {
            action,
            version: ANKI_CONNECT_VERSION,
            params,
        };

        let resp = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(action, status = status.as_u16(), "AnkiConnect: non-success status");
            return Err(AnkiError::Http {
                status: status.as_u16(),
            });
        }

        let body: AnkiResponse<T> = resp
            .json()
            .await
            .map_err(|e| AnkiError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            action,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "AnkiConnect: response received"
        );

        match body.error {
            Some(err) => Err(AnkiError::Remote(err)),
            None => Ok(body.result),
        }
    }
}

#[async_trait]
impl NoteService for AnkiConnectClient {
    async fn find_note(&self, note_id: i64) -> Result<NoteInfo, AnkiError> {
        let notes: Vec<NoteInfo> = self
            .invoke("notesInfo", json!({ "notes": [note_id] }))
            .await?
            .ok_or_else(|| AnkiError::InvalidResponse("notesInfo returned null".into()))?;

        notes
            .into_iter()
            .next()
            .filter(|note| note.note_id == Some(note_id))
            .ok_or(AnkiError::NoteNotFound(note_id))
    }

    async fn update_note_fields(
        &self,
        note_id: i64,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), AnkiError> {
        self.invoke::<_, serde_json::Value>(
            "updateNoteFields",
            json!({ "note": { "id": note_id, "fields": fields } }),
        )
        .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "anki-connect"
    }
}
