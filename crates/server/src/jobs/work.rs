// crates/server/src/jobs/work.rs
//! Seams between the generic run loop and a concrete job.

use async_trait::async_trait;
use anki_bridge_core::{HintSyncItem, VoiceItem};
use anki_bridge_db::DbError;

use super::types::ItemError;

/// A row reference handed from the enumerator to the processor.
pub trait WorkItem: Send + Sync + 'static {
    /// Row id, used as the keyset cursor for the next batch.
    fn id(&self) -> i64;
}

impl WorkItem for HintSyncItem {
    fn id(&self) -> i64 {
        self.id
    }
}

impl WorkItem for VoiceItem {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Finds rows that still need processing.
///
/// Batches are re-queried from the store every time, so rows completed or
/// edited elsewhere drop out (or appear) between batches.
#[async_trait]
pub trait WorkEnumerator: Send + Sync + 'static {
    type Item: WorkItem;

    /// Eligible rows with id greater than `after_id`, ordered by id, at most `limit`.
    async fn next_batch(&self, after_id: i64, limit: u32) -> Result<Vec<Self::Item>, DbError>;

    /// Number of eligible rows right now.
    async fn count_eligible(&self) -> Result<u64, DbError>;
}

/// Performs the work for one item.
#[async_trait]
pub trait ItemProcessor<I: WorkItem>: Send + Sync + 'static {
    async fn process(&self, item: &I) -> Result<(), ItemError>;
}
