// crates/core/src/anki/types.rs
//! Request/response/error types for the AnkiConnect protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// AnkiConnect API version spoken by this client.
pub const ANKI_CONNECT_VERSION: u32 = 6;

/// Errors from talking to AnkiConnect.
#[derive(Debug, Error)]
pub enum AnkiError {
    #[error("AnkiConnect request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AnkiConnect returned HTTP {status}")]
    Http { status: u16 },

    #[error("AnkiConnect error: {0}")]
    Remote(String),

    #[error("Note {0} not found")]
    NoteNotFound(i64),

    #[error("Unexpected AnkiConnect response: {0}")]
    InvalidResponse(String),
}

/// Envelope for every AnkiConnect call.
#[derive(Debug, Serialize)]
pub(crate) struct AnkiRequest<'a, P: Serialize> {
    pub action: &'a str,
    pub version: u32,
    pub params: P,
}

/// Envelope for every AnkiConnect reply. Exactly one of `result` / `error`
/// is meaningful.
#[derive(Debug, Deserialize)]
pub(crate) struct AnkiResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One field value of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteField {
    pub value: String,
    #[serde(default)]
    pub order: u32,
}

/// A note as returned by `notesInfo`.
///
/// AnkiConnect answers unknown ids with an empty object, so every field is
/// optional on the wire; [`NoteInfo::note_id`] being `None` means "missing".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    #[serde(default)]
    pub note_id: Option<i64>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, NoteField>,
}

impl NoteInfo {
    /// Current value of a field, if the note's model has it.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|f| f.value.as_str())
    }
}
