// crates/server/src/jobs/types.rs
//! Types shared by the background job controllers.

use std::time::Duration;

use anki_bridge_core::anki::AnkiError;
use anki_bridge_core::tts::TtsError;
use anki_bridge_core::{AudioError, HintError};
use anki_bridge_db::DbError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Which bulk job a controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    HintSync,
    Voice,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HintSync => "hint_sync",
            Self::Voice => "voice",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a job run: `Idle -> Running -> (Stopping) -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Stopping,
}

/// Snapshot of a job's progress, as served to polling clients.
///
/// Snapshots are immutable. The controller publishes a fresh one on every
/// change, so `succeeded_count + failed_count <= processed_count` holds in
/// every snapshot a reader can observe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub state: RunState,
    pub processed_count: u64,
    pub succeeded_count: u64,
    pub failed_count: u64,
    pub remaining_estimate: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl JobStatus {
    pub fn is_idle(&self) -> bool {
        self.state == RunState::Idle
    }
}

/// Batch size and per-item time limit for a job's run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub batch_size: u32,
    pub item_timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            item_timeout: Duration::from_secs(60),
        }
    }
}

/// Why a single item could not be processed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Hint(#[from] HintError),

    #[error(transparent)]
    Anki(#[from] AnkiError),

    #[error(transparent)]
    Speech(#[from] TtsError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("note {note_id} has no field named {field:?}")]
    MissingNoteField { note_id: i64, field: String },

    #[error("word {0} no longer exists")]
    RowMissing(i64),

    #[error("hint for word {0} changed while it was being processed")]
    HintChanged(i64),

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}
