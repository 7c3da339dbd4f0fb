// crates/server/src/jobs/runner.rs
//! Singleton controller and run loop for one bulk job.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anki_bridge_db::DbError;
use tokio::sync::watch;

use super::state::JobState;
use super::types::{ItemError, JobKind, JobStatus, RunConfig};
use super::work::{ItemProcessor, WorkEnumerator, WorkItem};
use crate::metrics::{record_job_item, record_job_run};

/// How a run loop ended without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    Exhausted,
    Cancelled,
}

/// Start/status/stop surface for one job type.
///
/// At most one run is active per controller. `start_if_needed` spawns the
/// run loop as a detached task and returns immediately; the loop pulls
/// batches from the enumerator, hands each item to the processor and
/// records the outcome, checking the cancellation flag before every item.
pub struct JobController<E, P> {
    state: JobState,
    enumerator: E,
    processor: P,
    config: RunConfig,
}

impl<E, P> JobController<E, P>
where
    E: WorkEnumerator,
    P: ItemProcessor<E::Item>,
{
    pub fn new(kind: JobKind, enumerator: E, processor: P, config: RunConfig) -> Arc<Self> {
        let config = RunConfig {
            batch_size: config.batch_size.max(1),
            ..config
        };
        Arc::new(Self {
            state: JobState::new(kind),
            enumerator,
            processor,
            config,
        })
    }

    pub fn kind(&self) -> JobKind {
        self.state.kind()
    }

    /// Start a run if none is active. Returns the status either way.
    pub fn start_if_needed(self: &Arc<Self>) -> Arc<JobStatus> {
        if self.state.try_begin() {
            tracing::info!(job = %self.kind(), batch_size = self.config.batch_size, "Job run started");
            let this = Arc::clone(self);
            tokio::spawn(async move { this.run().await });
        }
        self.state.snapshot()
    }

    pub fn status(&self) -> Arc<JobStatus> {
        self.state.snapshot()
    }

    /// Request a cooperative stop. No-op unless a run is `Running`.
    pub fn request_stop(&self) -> Arc<JobStatus> {
        if self.state.request_stop() {
            tracing::info!(job = %self.kind(), "Job stop requested");
        }
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<JobStatus>> {
        self.state.subscribe()
    }

    /// Wait up to `limit` for the job to be idle. Returns whether it is.
    pub async fn wait_idle(&self, limit: Duration) -> bool {
        let mut rx = self.subscribe();
        let reached = tokio::time::timeout(limit, rx.wait_for(|s| s.is_idle())).await;
        matches!(reached, Ok(Ok(_)))
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    async fn run(&self) {
        let kind = self.kind();
        let started = Instant::now();
        let mut guard = AbortGuard {
            state: &self.state,
            armed: true,
        };

        match self.enumerator.count_eligible().await {
            Ok(count) => self.state.set_remaining(count),
            Err(e) => tracing::warn!(job = %kind, error = %e, "Failed to count eligible rows"),
        }

        let (result, error) = match self.drain().await {
            Ok(RunEnd::Exhausted) => ("completed", None),
            Ok(RunEnd::Cancelled) => ("cancelled", None),
            Err(e) => {
                tracing::error!(job = %kind, error = %e, "Job run aborted by enumeration failure");
                ("failed", Some(format!("Enumeration failed: {e}")))
            }
        };
        guard.armed = false;
        let status = self.state.finish(error);
        record_job_run(kind, result);

        tracing::info!(
            job = %kind,
            result,
            processed = status.processed_count,
            succeeded = status.succeeded_count,
            failed = status.failed_count,
            duration_secs = started.elapsed().as_secs_f64(),
            "Job run finished"
        );
    }

    async fn drain(&self) -> Result<RunEnd, DbError> {
        let mut cursor = 0i64;
        loop {
            if self.state.is_cancel_requested() {
                return Ok(RunEnd::Cancelled);
            }
            let batch = self
                .enumerator
                .next_batch(cursor, self.config.batch_size)
                .await?;
            if batch.is_empty() {
                return Ok(RunEnd::Exhausted);
            }
            tracing::debug!(job = %self.kind(), after_id = cursor, size = batch.len(), "Fetched batch");

            for item in &batch {
                if self.state.is_cancel_requested() {
                    return Ok(RunEnd::Cancelled);
                }
                cursor = cursor.max(item.id());
                self.process_one(item).await;
            }
        }
    }

    async fn process_one(&self, item: &E::Item) {
        let kind = self.kind();
        let started = Instant::now();
        let timeout = self.config.item_timeout;

        let result = match tokio::time::timeout(timeout, self.processor.process(item)).await {
            Ok(result) => result,
            Err(_) => Err(ItemError::TimedOut(timeout)),
        };

        match result {
            Ok(()) => {
                record_job_item(kind, "succeeded", started.elapsed());
                tracing::debug!(job = %kind, word_id = item.id(), "Item processed");
                self.state.record_success();
            }
            Err(e) => {
                record_job_item(kind, "failed", started.elapsed());
                tracing::warn!(job = %kind, word_id = item.id(), error = %e, "Item failed");
                self.state.record_failure(format!("word {}: {e}", item.id()));
            }
        }
    }
}

/// Returns the job to idle if the run task unwinds before finishing.
struct AbortGuard<'a> {
    state: &'a JobState,
    armed: bool,
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::error!(job = %self.state.kind(), "Job run aborted unexpectedly");
        self.state.finish(Some("run aborted unexpectedly".into()));
        record_job_run(self.state.kind(), "aborted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::RunState;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Item(i64);

    impl WorkItem for Item {
        fn id(&self) -> i64 {
            self.0
        }
    }

    /// Rows `1..=n`, all eligible for the whole run.
    struct Rows {
        pending: Mutex<BTreeSet<i64>>,
        fail_batches: bool,
    }

    impl Rows {
        fn new(n: i64) -> Self {
            Self {
                pending: Mutex::new((1..=n).collect()),
                fail_batches: false,
            }
        }
    }

    #[async_trait]
    impl WorkEnumerator for Rows {
        type Item = Item;

        async fn next_batch(&self, after_id: i64, limit: u32) -> Result<Vec<Item>, DbError> {
            if self.fail_batches {
                return Err(DbError::NoDataDir);
            }
            Ok(self
                .pending
                .lock()
                .unwrap()
                .range(after_id + 1..)
                .take(limit as usize)
                .map(|id| Item(*id))
                .collect())
        }

        async fn count_eligible(&self) -> Result<u64, DbError> {
            Ok(self.pending.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<i64>>,
        fail_ids: Vec<i64>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ItemProcessor<Item> for Recorder {
        async fn process(&self, item: &Item) -> Result<(), ItemError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.seen.lock().unwrap().push(item.0);
            if self.fail_ids.contains(&item.0) {
                Err(ItemError::RowMissing(item.0))
            } else {
                Ok(())
            }
        }
    }

    fn config(batch_size: u32) -> RunConfig {
        RunConfig {
            batch_size,
            item_timeout: Duration::from_secs(5),
        }
    }

    async fn wait_idle<E, P>(ctl: &JobController<E, P>) -> Arc<JobStatus>
    where
        E: WorkEnumerator,
        P: ItemProcessor<E::Item>,
    {
        let mut rx = ctl.subscribe();
        let status = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.is_idle()))
            .await
            .expect("job did not finish")
            .unwrap()
            .clone();
        status
    }

    #[tokio::test]
    async fn test_all_items_succeed() {
        let ctl = JobController::new(JobKind::Voice, Rows::new(7), Recorder::default(), config(3));
        let started = ctl.start_if_needed();
        assert_eq!(started.state, RunState::Running);

        let done = wait_idle(&ctl).await;
        assert_eq!(done.processed_count, 7);
        assert_eq!(done.succeeded_count, 7);
        assert_eq!(done.failed_count, 0);
        assert_eq!(done.remaining_estimate, Some(0));
        assert!(done.ended_at.is_some());
        assert_eq!(*ctl.processor().seen.lock().unwrap(), (1..=7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failed_item_does_not_stop_batch() {
        let processor = Recorder {
            fail_ids: vec![2],
            ..Default::default()
        };
        let ctl = JobController::new(JobKind::HintSync, Rows::new(4), processor, config(25));
        ctl.start_if_needed();

        let done = wait_idle(&ctl).await;
        assert_eq!(done.processed_count, 4);
        assert_eq!(done.failed_count, 1);
        assert_eq!(done.succeeded_count, 3);
        assert_eq!(done.last_error.as_deref(), Some("word 2: word 2 no longer exists"));
        // Row 2 stays eligible but the cursor moved past it.
        assert_eq!(*ctl.processor().seen.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_repeated_start_runs_once() {
        let processor = Recorder {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let ctl = JobController::new(JobKind::Voice, Rows::new(3), processor, config(25));
        ctl.start_if_needed();
        ctl.start_if_needed();
        let third = ctl.start_if_needed();
        assert_eq!(third.state, RunState::Running);

        let done = wait_idle(&ctl).await;
        assert_eq!(done.processed_count, 3);
        assert_eq!(ctl.processor().seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stop_while_running() {
        let processor = Recorder {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let ctl = JobController::new(JobKind::Voice, Rows::new(100), processor, config(10));
        ctl.start_if_needed();

        let mut rx = ctl.subscribe();
        rx.wait_for(|s| s.processed_count >= 1).await.unwrap();
        let stopping = ctl.request_stop();
        assert_eq!(stopping.state, RunState::Stopping);

        let done = wait_idle(&ctl).await;
        let seen = ctl.processor().seen.lock().unwrap().len() as u64;
        assert!(done.processed_count < 100);
        assert_eq!(done.processed_count, seen);
        assert!(done.last_error.is_none());
    }

    #[tokio::test]
    async fn test_wait_idle_is_bounded() {
        let processor = Recorder {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let ctl = JobController::new(JobKind::HintSync, Rows::new(100), processor, config(10));
        assert!(ctl.wait_idle(Duration::from_millis(10)).await);

        ctl.start_if_needed();
        assert!(!ctl.wait_idle(Duration::from_millis(20)).await);

        ctl.request_stop();
        assert!(ctl.wait_idle(Duration::from_secs(5)).await);
        assert!(ctl.status().processed_count < 100);
    }

    #[tokio::test]
    async fn test_stop_while_idle_is_noop() {
        let ctl = JobController::new(JobKind::Voice, Rows::new(0), Recorder::default(), config(10));
        let status = ctl.request_stop();
        assert_eq!(status.state, RunState::Idle);
        assert!(status.started_at.is_none());
    }

    #[tokio::test]
    async fn test_enumeration_failure_ends_run() {
        let rows = Rows {
            fail_batches: true,
            ..Rows::new(3)
        };
        let ctl = JobController::new(JobKind::HintSync, rows, Recorder::default(), config(10));
        ctl.start_if_needed();

        let done = wait_idle(&ctl).await;
        assert_eq!(done.processed_count, 0);
        assert!(done.last_error.as_deref().unwrap().starts_with("Enumeration failed"));

        // A later start is allowed again.
        assert_eq!(ctl.start_if_needed().state, RunState::Running);
        wait_idle(&ctl).await;
    }

    #[tokio::test]
    async fn test_item_timeout_counts_as_failure() {
        let processor = Recorder {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let cfg = RunConfig {
            batch_size: 5,
            item_timeout: Duration::from_millis(10),
        };
        let ctl = JobController::new(JobKind::Voice, Rows::new(2), processor, cfg);
        ctl.start_if_needed();

        let done = wait_idle(&ctl).await;
        assert_eq!(done.processed_count, 2);
        assert_eq!(done.failed_count, 2);
        assert!(done.last_error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_snapshots_are_never_torn() {
        let processor = Recorder {
            fail_ids: vec![3, 6, 9],
            ..Default::default()
        };
        let ctl = JobController::new(JobKind::Voice, Rows::new(200), processor, config(7));
        let reader = {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move {
                loop {
                    let s = ctl.status();
                    assert!(s.succeeded_count + s.failed_count <= s.processed_count);
                    if s.is_idle() && s.ended_at.is_some() {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
            })
        };
        ctl.start_if_needed();
        reader.await.unwrap();
        let done = wait_idle(&ctl).await;
        assert_eq!(done.processed_count, 200);
        assert_eq!(done.failed_count, 3);
    }
}
