// crates/db/src/queries/words.rs
// Word rows: eligibility scans for the bulk jobs and their completion writes.

use anki_bridge_core::{now_millis, HintSyncItem, VoiceItem};
use serde::Serialize;
use sqlx::Row;

use super::row_types::{HintSyncRow, VoiceRow, HINT_SYNC_COLUMNS, VOICE_COLUMNS};
use crate::{Database, DbResult};

/// Rows with a linked note and no non-empty hint sentence yet.
const HINT_PENDING: &str = "anki_note_id IS NOT NULL \
     AND (hint_sentence IS NULL OR TRIM(hint_sentence) = '')";

/// Rows with a hint sentence whose audio is missing or older than the sentence.
const VOICE_PENDING: &str = "hint_sentence IS NOT NULL AND TRIM(hint_sentence) != '' \
     AND (hint_audio_file IS NULL OR hint_audio_at IS NULL \
          OR hint_audio_at < COALESCE(hint_updated_at, 0))";

/// Fields for inserting a word.
#[derive(Debug, Clone, Default)]
pub struct NewWord {
    pub word: String,
    pub ipa: Option<String>,
    pub translation: Option<String>,
    pub theme: Option<String>,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    pub anki_note_id: Option<i64>,
}

impl NewWord {
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            ..Default::default()
        }
    }
}

/// A full word row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: i64,
    pub word: String,
    pub ipa: Option<String>,
    pub translation: Option<String>,
    pub theme: Option<String>,
    pub example_sentence: Option<String>,
    pub example_translation: Option<String>,
    pub anki_note_id: Option<i64>,
    pub hint_sentence: Option<String>,
    pub hint_translation: Option<String>,
    pub hint_updated_at: Option<i64>,
    pub hint_audio_file: Option<String>,
    pub hint_audio_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for WordRecord {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            word: row.try_get("word")?,
            ipa: row.try_get("ipa")?,
            translation: row.try_get("translation")?,
            theme: row.try_get("theme")?,
            example_sentence: row.try_get("example_sentence")?,
            example_translation: row.try_get("example_translation")?,
            anki_note_id: row.try_get("anki_note_id")?,
            hint_sentence: row.try_get("hint_sentence")?,
            hint_translation: row.try_get("hint_translation")?,
            hint_updated_at: row.try_get("hint_updated_at")?,
            hint_audio_file: row.try_get("hint_audio_file")?,
            hint_audio_at: row.try_get("hint_audio_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Database {
    /// Insert a word. Returns the new row id.
    pub async fn insert_word(&self, word: &NewWord) -> DbResult<i64> {
        let now = now_millis();
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO words (word, ipa, translation, theme, example_sentence,
                               example_translation, anki_note_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING id
            "#,
        )
        .bind(&word.word)
        .bind(&word.ipa)
        .bind(&word.translation)
        .bind(&word.theme)
        .bind(&word.example_sentence)
        .bind(&word.example_translation)
        .bind(word.anki_note_id)
        .bind(now)
        .fetch_one(self.pool())
        .await?;
        Ok(row.0)
    }

    /// Fetch a word by id.
    pub async fn get_word(&self, id: i64) -> DbResult<Option<WordRecord>> {
        let row = sqlx::query_as::<_, WordRecord>("SELECT * FROM words WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    // ------------------------------------------------------------------------
    // Hint-sentence sync
    // ------------------------------------------------------------------------

    /// Next batch of words needing a hint sync, ordered by id, strictly after
    /// `after_id`.
    pub async fn next_hint_sync_batch(&self, after_id: i64, limit: u32) -> DbResult<Vec<HintSyncItem>> {
        let sql = format!(
            "SELECT {HINT_SYNC_COLUMNS} FROM words WHERE {HINT_PENDING} AND id > ?1 ORDER BY id ASC LIMIT ?2"
        );
        let rows: Vec<HintSyncRow> = sqlx::query_as(&sql)
            .bind(after_id)
            .bind(limit as i64)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(HintSyncRow::into_item).collect())
    }

    /// Number of words still needing a hint sync.
    pub async fn count_hint_sync_pending(&self) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM words WHERE {HINT_PENDING}");
        let row: (i64,) = sqlx::query_as(&sql).fetch_one(self.pool()).await?;
        Ok(row.0.max(0) as u64)
    }

    /// The word linked to an Anki note, regardless of sync state.
    ///
    /// If several rows point at the same note the lowest id wins.
    pub async fn get_hint_item_by_note(&self, note_id: i64) -> DbResult<Option<HintSyncItem>> {
        let sql = format!(
            "SELECT {HINT_SYNC_COLUMNS} FROM words WHERE anki_note_id = ?1 ORDER BY id ASC LIMIT 1"
        );
        let row: Option<HintSyncRow> = sqlx::query_as(&sql)
            .bind(note_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(HintSyncRow::into_item))
    }

    /// Record a hint as pushed to its note. Returns `false` if the row is gone.
    pub async fn mark_hint_synced(
        &self,
        id: i64,
        sentence: &str,
        translation: &str,
        at_ms: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE words SET
                hint_sentence = ?2,
                hint_translation = ?3,
                hint_updated_at = ?4,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(sentence)
        .bind(translation)
        .bind(at_ms)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------------
    // Voice generation
    // ------------------------------------------------------------------------

    /// Next batch of words needing hint audio, ordered by id, strictly after
    /// `after_id`.
    pub async fn next_voice_batch(&self, after_id: i64, limit: u32) -> DbResult<Vec<VoiceItem>> {
        let sql = format!(
            "SELECT {VOICE_COLUMNS} FROM words WHERE {VOICE_PENDING} AND id > ?1 ORDER BY id ASC LIMIT ?2"
        );
        let rows: Vec<VoiceRow> = sqlx::query_as(&sql)
            .bind(after_id)
            .bind(limit as i64)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(VoiceRow::into_item).collect())
    }

    /// Number of words still needing hint audio.
    pub async fn count_voice_pending(&self) -> DbResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM words WHERE {VOICE_PENDING}");
        let row: (i64,) = sqlx::query_as(&sql).fetch_one(self.pool()).await?;
        Ok(row.0.max(0) as u64)
    }

    /// Associate a generated audio file with a word.
    ///
    /// Only applies while the row still carries the hint the audio was
    /// generated from (`hint_updated_at` as enumerated). Returns `false` if
    /// the row is gone or its hint changed in the meantime.
    pub async fn record_hint_audio(
        &self,
        id: i64,
        hint_updated_at: Option<i64>,
        filename: &str,
        at_ms: i64,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE words SET
                hint_audio_file = ?3,
                hint_audio_at = ?4,
                updated_at = ?4
            WHERE id = ?1 AND hint_updated_at IS ?2
            "#,
        )
        .bind(id)
        .bind(hint_updated_at)
        .bind(filename)
        .bind(at_ms)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
