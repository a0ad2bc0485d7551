use crate::crawlers::{JobContext, SessionJob, execute};
use crate::error::{HarvestError, Result};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

/// A job that did not produce output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub job: String,
    /// Error kind, see [`HarvestError::kind`]
    pub kind: &'static str,
    pub message: String,
}

/// What happened in one fan-out phase
#[derive(Debug, Clone, Default)]
pub struct PhaseReport {
    pub phase: String,
    pub submitted: usize,
    pub succeeded: usize,
    pub failures: Vec<JobFailure>,
}

/// Runs every job with at most `limit` in flight, admitting the next job as
/// soon as a slot frees up.
///
/// Results are funnelled through one channel and `aggregate` is only ever
/// called from the receiving loop, so aggregation never runs concurrently.
/// A failing job is logged and reported; it does not affect its siblings.
pub async fn run_phase<J, F>(
    phase: &str,
    jobs: Vec<J>,
    limit: usize,
    ctx: Arc<JobContext>,
    mut aggregate: F,
) -> PhaseReport
where
    J: SessionJob,
    F: FnMut(J::Output),
{
    let submitted = jobs.len();
    let limit = limit.max(1);
    ::log::info!(
        "{} phase: {} jobs, at most {} at a time",
        phase,
        submitted,
        limit
    );

    let semaphore = Arc::new(Semaphore::new(limit));
    let (result_tx, mut result_rx) =
        mpsc::channel::<(String, Result<J::Output>)>(submitted.max(1));
    let mut workers = JoinSet::new();

    for (worker_id, job) in jobs.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let ctx = Arc::clone(&ctx);
        let result_tx = result_tx.clone();

        workers.spawn(async move {
            let label = job.label();
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    ::log::debug!("Worker {} started {}", worker_id, label);
                    execute(&ctx, &job).await
                }
                Err(_) => Err(HarvestError::Session("worker pool closed".to_string())),
            };
            if let Err(e) = result_tx.send((label, outcome)).await {
                ::log::error!("Worker {} failed to send result: {}", worker_id, e);
            }
        });
    }

    // Drop the original sender so the loop below ends once every worker is done
    drop(result_tx);

    let mut report = PhaseReport {
        phase: phase.to_string(),
        submitted,
        ..PhaseReport::default()
    };

    while let Some((label, outcome)) = result_rx.recv().await {
        match outcome {
            Ok(output) => {
                report.succeeded += 1;
                aggregate(output);
            }
            Err(e) => {
                ::log::warn!("{} job {} failed [{}]: {}", phase, label, e.kind(), e);
                report.failures.push(JobFailure {
                    job: label,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            ::log::error!("{} worker panicked: {}", phase, e);
            report.failures.push(JobFailure {
                job: "unknown".to_string(),
                kind: "panic",
                message: e.to_string(),
            });
        }
    }

    ::log::info!(
        "{} phase finished: {} of {} jobs succeeded",
        phase,
        report.succeeded,
        submitted
    );
    report
}
