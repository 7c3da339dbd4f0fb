// crates/server/src/jobs/state.rs
//! Process-wide progress state for one job type.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use super::types::{JobKind, JobStatus, RunState};

/// Status recorder and cancellation flag for a single job type.
///
/// The current [`JobStatus`] lives in a `watch` channel. Every mutation
/// builds a new snapshot and swaps it in under the channel's lock, so
/// readers always get a complete, consistent `Arc<JobStatus>` and SSE
/// subscribers are woken on each change.
pub struct JobState {
    kind: JobKind,
    status: watch::Sender<Arc<JobStatus>>,
    cancel_requested: AtomicBool,
}

impl JobState {
    pub fn new(kind: JobKind) -> Self {
        let (status, _) = watch::channel(Arc::new(JobStatus::default()));
        Self {
            kind,
            status,
            cancel_requested: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Current snapshot. Never waits on the run loop.
    pub fn snapshot(&self) -> Arc<JobStatus> {
        Arc::clone(&self.status.borrow())
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<JobStatus>> {
        self.status.subscribe()
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    /// Move `Idle -> Running` with fresh counters.
    ///
    /// Returns `false` without touching anything if a run is already active.
    /// The check and the transition happen under the same lock, so of any
    /// number of concurrent callers exactly one wins.
    pub(crate) fn try_begin(&self) -> bool {
        self.status.send_if_modified(|current| {
            if current.state != RunState::Idle {
                return false;
            }
            self.cancel_requested.store(false, Ordering::Release);
            *current = Arc::new(JobStatus {
                state: RunState::Running,
                started_at: Some(Utc::now()),
                ..JobStatus::default()
            });
            true
        })
    }

    /// Ask the active run to stop after its current item.
    ///
    /// Returns `false` if there is no running job (idle, or already stopping).
    pub(crate) fn request_stop(&self) -> bool {
        self.status.send_if_modified(|current| {
            if current.state != RunState::Running {
                return false;
            }
            self.cancel_requested.store(true, Ordering::Release);
            let mut next = JobStatus::clone(current);
            next.state = RunState::Stopping;
            *current = Arc::new(next);
            true
        })
    }

    pub(crate) fn set_remaining(&self, remaining: u64) {
        self.update(|s| s.remaining_estimate = Some(remaining));
    }

    pub(crate) fn record_success(&self) {
        self.update(|s| {
            s.processed_count += 1;
            s.succeeded_count += 1;
            s.remaining_estimate = s.remaining_estimate.map(|r| r.saturating_sub(1));
        });
    }

    pub(crate) fn record_failure(&self, message: String) {
        self.update(|s| {
            s.processed_count += 1;
            s.failed_count += 1;
            s.remaining_estimate = s.remaining_estimate.map(|r| r.saturating_sub(1));
            s.last_error = Some(message);
        });
    }

    /// Return to `Idle` and stamp `ended_at`. A fatal error replaces `last_error`.
    ///
    /// Returns the final snapshot of the run, unaffected by any run started
    /// right afterwards.
    pub(crate) fn finish(&self, error: Option<String>) -> Arc<JobStatus> {
        self.update(|s| {
            s.state = RunState::Idle;
            s.ended_at = Some(Utc::now());
            if error.is_some() {
                s.last_error = error;
            }
        })
    }

    fn update(&self, f: impl FnOnce(&mut JobStatus)) -> Arc<JobStatus> {
        let mut published = Arc::default();
        self.status.send_modify(|current| {
            let mut next = JobStatus::clone(current);
            f(&mut next);
            let next = Arc::new(next);
            published = Arc::clone(&next);
            *current = next;
        });
        published
    }
}
