// crates/core/src/anki/service.rs
//! NoteService trait defining the interface to the flashcard tool.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::types::{AnkiError, NoteInfo};

/// Remote flashcard notes: find by id, update fields.
///
/// Notes are owned by the flashcard tool; the bridge only mutates the fields
/// it is told to.
#[async_trait]
pub trait NoteService: Send + Sync {
    /// Fetch a note by id. `AnkiError::NoteNotFound` if it does not exist.
    async fn find_note(&self, note_id: i64) -> Result<NoteInfo, AnkiError>;

    /// Overwrite the given fields on a note. Fields not listed are untouched.
    async fn update_note_fields(
        &self,
        note_id: i64,
        fields: &BTreeMap<String, String>,
    ) -> Result<(), AnkiError>;

    /// Service name for logging (e.g. "anki-connect").
    fn name(&self) -> &str;
}
