use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};

use crate::cancel::CancelToken;
use crate::results::{BatchRun, BatchSummary};
use crate::types::{JobOutcome, JobRequest};
use crate::ExecuteJob;

/// Progress event emitted by [`run_batch`] as the batch advances.
///
/// Consumed by presentation or export layers; payloads serialize in
/// camelCase for direct forwarding to a UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum BatchEvent {
    /// The batch has started; no jobs dispatched yet.
    Started { total: usize },
    /// One job reached its terminal outcome. Completion order is not
    /// submission order; `request.index` identifies the item. The counts
    /// are running totals at the time of the event.
    ItemFinished {
        request: JobRequest,
        outcome: JobOutcome,
        completed: usize,
        successful: usize,
        failed: usize,
        cancelled: usize,
        total: usize,
    },
    /// All dispatched work has finished.
    Finished { summary: BatchSummary },
}

impl BatchEvent {
    /// Human-readable one-line status, in the shape the original batch
    /// tooling shows while running.
    pub fn progress_line(&self) -> String {
        match self {
            Self::Started { total } => format!("Starting batch: {} requests", total),
            Self::ItemFinished {
                completed,
                successful,
                failed,
                total,
                ..
            } => format!(
                "Processing: {}/{} ({} ok | {} err)",
                completed, total, successful, failed
            ),
            Self::Finished { summary } => format!(
                "Batch complete: total {} | successful {} | failed {}",
                summary.total, summary.successful, summary.failed
            ),
        }
    }
}

/// Run a batch of jobs with bounded concurrency.
///
/// At most `concurrency` jobs execute at once (clamped to at least 1).
/// Dispatch follows input order; completion order is unconstrained and
/// outcomes are reported as they arrive. One job's failure never aborts
/// its siblings: every error is captured into that item's [`JobOutcome`].
///
/// When the cancellation token is set, no further jobs are dispatched and
/// the remaining requests are recorded as `Cancelled`; jobs already
/// dispatched run to their own terminal outcome (the token is also
/// visible inside each job's poll loop, so in-flight jobs usually stop at
/// their next checkpoint).
///
/// Counters and the results collection are owned by a single consuming
/// loop fed over a channel, so concurrent completions cannot lose updates.
/// The returned [`BatchRun`] is finalized: it holds exactly one
/// (request, outcome) pair per input request, ordered by index.
pub async fn run_batch<E, F>(
    executor: E,
    requests: Vec<JobRequest>,
    concurrency: usize,
    cancel: CancelToken,
    mut on_event: F,
) -> BatchRun
where
    E: ExecuteJob,
    F: FnMut(BatchEvent),
{
    let total = requests.len();
    let executor = Arc::new(executor);
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<(JobRequest, JobOutcome)>();

    on_event(BatchEvent::Started { total });

    let dispatch_cancel = cancel.clone();
    let dispatcher = tokio::spawn(async move {
        for request in requests {
            if dispatch_cancel.is_cancelled() {
                let _ = tx.send((request, JobOutcome::Cancelled));
                continue;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                // The semaphore is never closed; treat as a stop signal.
                Err(_) => {
                    let _ = tx.send((request, JobOutcome::Cancelled));
                    continue;
                }
            };

            // A stop request may have arrived while waiting for a slot.
            if dispatch_cancel.is_cancelled() {
                let _ = tx.send((request, JobOutcome::Cancelled));
                continue;
            }

            let tx = tx.clone();
            let executor = executor.clone();
            let worker_cancel = dispatch_cancel.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let outcome = executor.execute(&request, &worker_cancel).await;
                let _ = tx.send((request, outcome));
            });
        }
    });

    let mut run = BatchRun::new();
    while let Some((request, outcome)) = rx.recv().await {
        run.record(request.clone(), outcome.clone());
        on_event(BatchEvent::ItemFinished {
            request,
            outcome,
            completed: run.total(),
            successful: run.successful(),
            failed: run.failed(),
            cancelled: run.cancelled(),
            total,
        });
    }

    let _ = dispatcher.await;
    if run.total() != total {
        eprintln!(
            "[genvr-batch] batch lost {} worker(s); run has {} of {} outcomes",
            total - run.total(),
            run.total(),
            total
        );
    }

    run.finalize();
    on_event(BatchEvent::Finished {
        summary: run.summary(),
    });
    run
}
