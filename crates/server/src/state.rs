// crates/server/src/state.rs
//! Application state for the Axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anki_bridge_core::anki::NoteService;
use anki_bridge_core::tts::SpeechProvider;
use anki_bridge_db::Database;

use crate::hint_sync::{HintFields, HintSyncJob, HintSyncProcessor, HintSyncSource};
use crate::jobs::{JobKind, RunConfig};
use crate::voice::{VoiceJob, VoiceProcessor, VoiceSource};

/// Everything needed to build an [`AppState`].
pub struct AppDeps {
    pub db: Database,
    pub notes: Arc<dyn NoteService>,
    pub speech: Arc<dyn SpeechProvider>,
    pub audio_dir: PathBuf,
    pub audio_public_prefix: String,
    pub audio_keep_per_word: usize,
    pub hint_fields: HintFields,
    pub run_config: RunConfig,
}

/// Shared application state accessible from all route handlers.
///
/// Created once at startup. The two job controllers are the process-wide
/// singletons for their job type.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Row store.
    pub db: Database,
    /// Hint-sentence sync job.
    pub hint_sync: Arc<HintSyncJob>,
    /// Voice generation job.
    pub voice: Arc<VoiceJob>,
    /// Directory generated audio lives in.
    pub audio_dir: PathBuf,
    /// URL prefix audio files are served under (no trailing slash).
    pub audio_public_prefix: String,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(deps: AppDeps) -> Arc<Self> {
        let hint_sync = HintSyncJob::new(
            JobKind::HintSync,
            HintSyncSource::new(deps.db.clone()),
            HintSyncProcessor::new(deps.db.clone(), deps.notes, deps.hint_fields),
            deps.run_config,
        );
        let voice = VoiceJob::new(
            JobKind::Voice,
            VoiceSource::new(deps.db.clone()),
            VoiceProcessor::new(
                deps.db.clone(),
                deps.speech,
                deps.audio_dir.clone(),
                deps.audio_keep_per_word,
            ),
            deps.run_config,
        );

        Arc::new(Self {
            start_time: Instant::now(),
            db: deps.db,
            hint_sync,
            voice,
            audio_dir: deps.audio_dir,
            audio_public_prefix: crate::config::normalize_prefix(&deps.audio_public_prefix),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Ask both jobs to stop after their current item.
    pub fn stop_jobs(&self) {
        self.hint_sync.request_stop();
        self.voice.request_stop();
    }

    /// Wait up to `limit` for both jobs to be idle. Returns `false` if either
    /// is still running when the limit passes.
    pub async fn wait_jobs_idle(&self, limit: Duration) -> bool {
        let (hint_sync, voice) = tokio::join!(
            self.hint_sync.wait_idle(limit),
            self.voice.wait_idle(limit)
        );
        hint_sync && voice
    }

    /// Public URL for an audio file name.
    pub fn public_audio_path(&self, filename: &str) -> String {
        format!("{}/{}", self.audio_public_prefix, filename)
    }
}
