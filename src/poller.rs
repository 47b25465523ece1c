//! Completion polling.
//!
//! A submitted job is queried at a fixed interval until its status becomes
//! terminal (`SUCCESS`, `FAILED` or `TIMEOUT`). Terminal failures come back
//! as a normal [`Prediction`]; only the fetch itself, cancellation, or an
//! expired deadline produce an `Err`.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{LiblibError, Result};
use crate::types::{JobHandle, Prediction};

/// Optional bounds on a polling loop. The default polls until a terminal
/// status arrives, however long that takes.
#[derive(Debug, Clone, Default)]
pub struct PollOptions {
    cancel: Option<CancellationToken>,
    deadline: Option<Duration>,
}

impl PollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort polling when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Give up once `deadline` has elapsed since polling started.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

/// Drives the submit-then-poll protocol for a single job.
#[derive(Debug, Clone, Copy)]
pub struct JobPoller {
    interval: Duration,
}

impl JobPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `fetch` until the job reaches a terminal status.
    ///
    /// The first fetch happens immediately; each later one follows a sleep of
    /// the configured interval. Exactly one fetch is in flight at a time.
    pub async fn await_completion<F, Fut>(
        &self,
        handle: &JobHandle,
        fetch: F,
        options: &PollOptions,
    ) -> Result<Prediction>
    where
        F: FnMut(JobHandle) -> Fut,
        Fut: Future<Output = Result<Prediction>>,
    {
        self.await_completion_observed(handle, fetch, options, |_| {})
            .await
    }

    /// Like [`await_completion`](Self::await_completion), calling
    /// `on_update` with every status payload received, terminal or not.
    pub async fn await_completion_observed<F, Fut, P>(
        &self,
        handle: &JobHandle,
        mut fetch: F,
        options: &PollOptions,
        mut on_update: P,
    ) -> Result<Prediction>
    where
        F: FnMut(JobHandle) -> Fut,
        Fut: Future<Output = Result<Prediction>>,
        P: FnMut(&Prediction),
    {
        // a deadline too far out to represent never fires
        let deadline = options.deadline.and_then(|d| Instant::now().checked_add(d));
        let cancel = options.cancel.as_ref();
        let mut attempts: u64 = 0;

        loop {
            if cancel.is_some_and(|token| token.is_cancelled()) {
                return Err(LiblibError::Cancelled);
            }
            let prediction = guarded(fetch(handle.clone()), deadline, cancel).await?;
            attempts = attempts.saturating_add(1);
            on_update(&prediction);

            let status = prediction.status();
            if status.is_terminal() {
                tracing::info!(job = %handle, %status, attempts, "job finished");
                return Ok(prediction);
            }
            tracing::debug!(
                job = %handle,
                %status,
                percent = prediction.percent_completed,
                "job still running"
            );

            guarded(
                async {
                    tokio::time::sleep(self.interval).await;
                    Ok(())
                },
                deadline,
                cancel,
            )
            .await?;
        }
    }
}

/// Run `fut` unless cancellation or the deadline comes first.
async fn guarded<T, Fut>(
    fut: Fut,
    deadline: Option<Instant>,
    cancel: Option<&CancellationToken>,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };
    let expired = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Err(LiblibError::Cancelled),
        _ = expired => Err(LiblibError::DeadlineExceeded),
        res = fut => res,
    }
}
