// crates/server/src/voice.rs
//! Voice generation: synthesize hint-sentence audio for each word.

use std::path::PathBuf;
use std::sync::Arc;

use anki_bridge_core::audio::{prune_older, write_asset};
use anki_bridge_core::tts::{SpeechProvider, SpeechRequest};
use anki_bridge_core::{now_millis, VoiceItem};
use anki_bridge_db::{Database, DbError};
use async_trait::async_trait;

use crate::jobs::{ItemError, ItemProcessor, JobController, WorkEnumerator};

/// Controller type for the voice job.
pub type VoiceJob = JobController<VoiceSource, VoiceProcessor>;

/// Words with a hint sentence but no current audio.
pub struct VoiceSource {
    db: Database,
}

impl VoiceSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkEnumerator for VoiceSource {
    type Item = VoiceItem;

    async fn next_batch(&self, after_id: i64, limit: u32) -> Result<Vec<VoiceItem>, DbError> {
        self.db.next_voice_batch(after_id, limit).await
    }

    async fn count_eligible(&self) -> Result<u64, DbError> {
        self.db.count_voice_pending().await
    }
}

/// Synthesizes, writes the file, records it on the row, then prunes old files.
pub struct VoiceProcessor {
    db: Database,
    speech: Arc<dyn SpeechProvider>,
    audio_dir: PathBuf,
    keep_per_word: usize,
}

impl VoiceProcessor {
    pub fn new(
        db: Database,
        speech: Arc<dyn SpeechProvider>,
        audio_dir: PathBuf,
        keep_per_word: usize,
    ) -> Self {
        Self {
            db,
            speech,
            audio_dir,
            keep_per_word: keep_per_word.max(1),
        }
    }
}

#[async_trait]
impl ItemProcessor<VoiceItem> for VoiceProcessor {
    async fn process(&self, item: &VoiceItem) -> Result<(), ItemError> {
        let audio = self
            .speech
            .synthesize(SpeechRequest::new(item.hint_sentence.trim()))
            .await?;

        let asset = write_asset(&self.audio_dir, item.id, now_millis(), &audio).await?;
        let filename = asset.filename();

        let recorded = self
            .db
            .record_hint_audio(item.id, item.hint_updated_at, &filename, asset.timestamp_ms)
            .await?;
        if !recorded {
            // The row was deleted or its hint rewritten mid-item; the file is orphaned.
            if let Err(e) = tokio::fs::remove_file(self.audio_dir.join(&filename)).await {
                tracing::warn!(word_id = item.id, file = %filename, error = %e, "Failed to remove orphaned audio");
            }
            return Err(match self.db.get_word(item.id).await? {
                Some(_) => ItemError::HintChanged(item.id),
                None => ItemError::RowMissing(item.id),
            });
        }

        match prune_older(&self.audio_dir, item.id, self.keep_per_word).await {
            Ok(removed) if !removed.is_empty() => {
                tracing::debug!(word_id = item.id, removed = removed.len(), "Pruned old audio");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(word_id = item.id, error = %e, "Failed to prune old audio"),
        }

        tracing::debug!(
            word_id = item.id,
            file = %filename,
            bytes = audio.len(),
            provider = self.speech.name(),
            "Hint audio generated"
        );
        Ok(())
    }
}
