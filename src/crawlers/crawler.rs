use crate::crawlers::{Browser, BrowserSession};
use crate::error::{HarvestError, Result};
use crate::parsers::PageModel;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Shared by every job of a run
pub struct JobContext {
    pub browser: Arc<dyn Browser>,
    pub page: Arc<dyn PageModel>,
    /// Deadline for a whole attempt
    pub job_timeout: Duration,
    /// Deadline for a single wait on the page
    pub step_timeout: Duration,
    /// Attempts for transient failures, at least 1
    pub max_attempts: usize,
}

// Define a base trait for work driven through one browser session
#[async_trait]
pub trait SessionJob: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Short description for logs
    fn label(&self) -> String;

    /// Drive the session to produce the job's output
    async fn run(&self, session: &mut dyn BrowserSession, ctx: &JobContext) -> Result<Self::Output>;
}

/// Runs a job with a fresh session per attempt, retrying transient failures
pub async fn execute<J: SessionJob>(ctx: &JobContext, job: &J) -> Result<J::Output> {
    let attempts = ctx.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match run_scoped(ctx, job).await {
            Ok(output) => return Ok(output),
            Err(e) if e.is_retryable() && attempt < attempts => {
                ::log::warn!(
                    "{} attempt {}/{} failed [{}]: {}; retrying",
                    job.label(),
                    attempt,
                    attempts,
                    e.kind(),
                    e
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One attempt: open a session, run under the job deadline, always close.
///
/// Opening shares the job deadline; closing gets one step timeout of its own,
/// after which the session is abandoned and the job outcome is returned as is.
/// When the deadline passes the job future is dropped before the session is closed.
async fn run_scoped<J: SessionJob>(ctx: &JobContext, job: &J) -> Result<J::Output> {
    let mut session = match timeout(ctx.job_timeout, ctx.browser.open()).await {
        Ok(opened) => opened?,
        Err(_) => {
            return Err(HarvestError::Timeout {
                what: format!("opening a session for {}", job.label()),
                elapsed: ctx.job_timeout,
            });
        }
    };

    let outcome = match timeout(ctx.job_timeout, job.run(session.as_mut(), ctx)).await {
        Ok(result) => result,
        Err(_) => Err(HarvestError::Timeout {
            what: job.label(),
            elapsed: ctx.job_timeout,
        }),
    };

    match timeout(ctx.step_timeout, session.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            ::log::warn!("Failed to close browser session for {}: {}", job.label(), e);
        }
        Err(_) => {
            ::log::warn!(
                "Abandoned browser session for {}: close did not finish within {:?}",
                job.label(),
                ctx.step_timeout
            );
        }
    }

    outcome
}
