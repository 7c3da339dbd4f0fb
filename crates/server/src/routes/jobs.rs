// crates/server/src/routes/jobs.rs
//! Response envelope and SSE stream shared by the job control routes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::Serialize;
use tokio::sync::watch;

use crate::jobs::JobStatus;

/// `{ ok: true, status }` body returned by every job control endpoint.
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub ok: bool,
    pub status: JobStatus,
}

impl StatusEnvelope {
    pub fn json(status: Arc<JobStatus>) -> Json<Self> {
        Json(Self {
            ok: true,
            status: JobStatus::clone(&status),
        })
    }
}

/// SSE stream of `status` events: the current snapshot, then one per change,
/// ending after the first idle snapshot.
pub fn status_stream(
    mut rx: watch::Receiver<Arc<JobStatus>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        loop {
            let status = Arc::clone(&rx.borrow_and_update());
            match Event::default().event("status").json_data(&*status) {
                Ok(event) => yield Ok(event),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize SSE status");
                    break;
                }
            }
            if status.is_idle() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
