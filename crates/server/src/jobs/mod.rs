// crates/server/src/jobs/mod.rs
//! Background job coordination for the bulk word jobs.
//!
//! Provides:
//! - `JobController` - singleton start/status/stop surface plus run loop
//! - `JobState` - status recorder and cancellation flag
//! - `WorkEnumerator` / `ItemProcessor` - seams a concrete job plugs into
//! - `JobStatus` - snapshot served to polling and SSE clients

pub mod runner;
pub mod state;
pub mod types;
pub mod work;

pub use runner::JobController;
pub use state::JobState;
pub use types::{ItemError, JobKind, JobStatus, RunConfig, RunState};
pub use work::{ItemProcessor, WorkEnumerator, WorkItem};
