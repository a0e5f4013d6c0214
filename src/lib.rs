//! # genvr-batch
//!
//! Async client and concurrent batch runner for the GenVR generation API.
//!
//! GenVR exposes a three-step workflow for every generation job: submit it
//! via `/v2/generate`, poll `/v2/status` until the task reaches a terminal
//! state, then fetch the output from `/v2/response`. This crate drives
//! that workflow for single requests and for batches of many requests
//! executed with bounded concurrency.
//!
//! ## Key features
//!
//! - **Three-step job client** — submit, poll at a fixed one-second
//!   cadence (capped at 300 iterations), fetch the output
//! - **Bounded-concurrency batches** — dispatch in input order, report
//!   outcomes as they complete, never let one failure abort siblings
//! - **Cooperative cancellation** — a shared [`CancelToken`] observed
//!   before each dispatch and between poll iterations
//! - **Index-keyed aggregation** — every request contributes exactly one
//!   outcome; flatten generated artifacts or export the full result set
//!   with embedded base64 payloads masked for display
//!
//! ## Quick Start
//!
//! ```no_run
//! use genvr_batch::{run_batch, CancelToken, Credentials, GenVrClient, JobRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GenVrClient::new(
//!         "https://api.genvrresearch.com",
//!         Credentials::new("user-123", "sk-..."),
//!     );
//!
//!     let requests: Vec<JobRequest> = (0..10)
//!         .map(|i| {
//!             let mut params = serde_json::Map::new();
//!             params.insert("prompt".into(), format!("variation {}", i).into());
//!             JobRequest::new(i, "imggen", "text_to_image", params)
//!         })
//!         .collect();
//!
//!     let run = run_batch(client, requests, 3, CancelToken::new(), |event| {
//!         println!("{}", event.progress_line());
//!     })
//!     .await;
//!
//!     for artifact in run.artifacts() {
//!         println!("request {} -> {}", artifact.request_index, artifact.reference);
//!     }
//! }
//! ```

pub mod batch;
pub mod cancel;
pub mod client;
pub mod error;
pub mod results;
pub mod types;

pub use batch::{run_batch, BatchEvent};
pub use cancel::CancelToken;
pub use client::{GenVrClient, MAX_POLL_ITERATIONS, POLL_INTERVAL};
pub use error::{GenVrError, Result};
pub use results::{mask_embedded_data, ArtifactRef, BatchRun, BatchSummary};
pub use types::{Credentials, JobHandle, JobOutcome, JobRequest, PollStatus, TaskStatus};

/// Trait for executing one job to its terminal outcome.
///
/// [`run_batch`] is generic over this seam so the coordinator can be
/// exercised without a live API. [`GenVrClient`] implements it with the
/// full submit/poll/fetch workflow.
///
/// Implementations must capture every error into the returned
/// [`JobOutcome`] rather than panicking: the coordinator treats the
/// outcome as the single source of truth for the item.
pub trait ExecuteJob: Send + Sync + 'static {
    /// Execute a single job.
    ///
    /// # Arguments
    /// * `request` — the job's parameters and batch position
    /// * `cancel` — shared token, to be checked between blocking steps
    fn execute(
        &self,
        request: &JobRequest,
        cancel: &CancelToken,
    ) -> impl std::future::Future<Output = JobOutcome> + Send;
}
