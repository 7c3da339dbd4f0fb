// crates/db/src/queries/row_types.rs
// Internal row types for job work items.

use anki_bridge_core::{HintSyncItem, VoiceItem};
use sqlx::Row;

/// Column list matching [`HintSyncRow`].
pub(crate) const HINT_SYNC_COLUMNS: &str =
    "id, word, ipa, example_sentence, example_translation, anki_note_id";

/// Column list matching [`VoiceRow`].
pub(crate) const VOICE_COLUMNS: &str = "id, word, hint_sentence, hint_updated_at";

#[derive(Debug)]
pub(crate) struct HintSyncRow {
    id: i64,
    word: String,
    ipa: Option<String>,
    example_sentence: Option<String>,
    example_translation: Option<String>,
    anki_note_id: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for HintSyncRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            word: row.try_get("word")?,
            ipa: row.try_get("ipa")?,
            example_sentence: row.try_get("example_sentence")?,
            example_translation: row.try_get("example_translation")?,
            anki_note_id: row.try_get("anki_note_id")?,
        })
    }
}

impl HintSyncRow {
    pub(crate) fn into_item(self) -> HintSyncItem {
        HintSyncItem {
            id: self.id,
            word: self.word,
            ipa: self.ipa,
            example_sentence: self.example_sentence,
            example_translation: self.example_translation,
            anki_note_id: self.anki_note_id,
        }
    }
}

#[derive(Debug)]
pub(crate) struct VoiceRow {
    id: i64,
    word: String,
    hint_sentence: String,
    hint_updated_at: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for VoiceRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            word: row.try_get("word")?,
            hint_sentence: row.try_get("hint_sentence")?,
            hint_updated_at: row.try_get("hint_updated_at")?,
        })
    }
}

impl VoiceRow {
    pub(crate) fn into_item(self) -> VoiceItem {
        VoiceItem {
            id: self.id,
            word: self.word,
            hint_sentence: self.hint_sentence,
            hint_updated_at: self.hint_updated_at,
        }
    }
}
