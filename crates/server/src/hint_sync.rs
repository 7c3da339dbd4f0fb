// crates/server/src/hint_sync.rs
//! Hint-sentence sync: push each linked word's hint into its Anki note.

use std::sync::Arc;

use anki_bridge_core::anki::NoteService;
use anki_bridge_core::{derive_hint, now_millis, HintSyncItem, SyncedNote};
use anki_bridge_db::{Database, DbError};
use async_trait::async_trait;

use crate::jobs::{ItemError, ItemProcessor, JobController, WorkEnumerator};

/// Controller type for the hint-sync job.
pub type HintSyncJob = JobController<HintSyncSource, HintSyncProcessor>;

/// Note field names the hint is written into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintFields {
    pub sentence: String,
    pub translation: String,
}

impl Default for HintFields {
    fn default() -> Self {
        Self {
            sentence: "Hint".to_string(),
            translation: "HintTranslation".to_string(),
        }
    }
}

/// Linked words whose hint sentence is still missing.
pub struct HintSyncSource {
    db: Database,
}

impl HintSyncSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkEnumerator for HintSyncSource {
    type Item = HintSyncItem;

    async fn next_batch(&self, after_id: i64, limit: u32) -> Result<Vec<HintSyncItem>, DbError> {
        self.db.next_hint_sync_batch(after_id, limit).await
    }

    async fn count_eligible(&self) -> Result<u64, DbError> {
        self.db.count_hint_sync_pending().await
    }
}

/// Derives a word's hint, writes it to the note, then marks the row.
pub struct HintSyncProcessor {
    db: Database,
    notes: Arc<dyn NoteService>,
    fields: HintFields,
}

impl HintSyncProcessor {
    pub fn new(db: Database, notes: Arc<dyn NoteService>, fields: HintFields) -> Self {
        Self { db, notes, fields }
    }

    /// Sync one word. The row is only marked once the note update succeeded.
    pub async fn sync_item(&self, item: &HintSyncItem) -> Result<SyncedNote, ItemError> {
        let hint = derive_hint(item)?;
        let note_id = item.anki_note_id;

        let note = self.notes.find_note(note_id).await?;
        for field in [&self.fields.sentence, &self.fields.translation] {
            if note.field(field).is_none() {
                return Err(ItemError::MissingNoteField {
                    note_id,
                    field: field.clone(),
                });
            }
        }

        let fields = hint.note_fields(&self.fields.sentence, &self.fields.translation);
        self.notes.update_note_fields(note_id, &fields).await?;

        let marked = self
            .db
            .mark_hint_synced(item.id, &hint.sentence, &hint.translation, now_millis())
            .await?;
        if !marked {
            return Err(ItemError::RowMissing(item.id));
        }

        tracing::debug!(word_id = item.id, note_id, service = self.notes.name(), "Hint synced");
        Ok(SyncedNote {
            note_id,
            word_id: item.id,
            word: item.word.clone(),
            hint_sentence: hint.sentence,
            hint_translation: hint.translation,
            keyword: hint.keyword.map(str::to_string),
        })
    }
}

#[async_trait]
impl ItemProcessor<HintSyncItem> for HintSyncProcessor {
    async fn process(&self, item: &HintSyncItem) -> Result<(), ItemError> {
        self.sync_item(item).await.map(|_| ())
    }
}
