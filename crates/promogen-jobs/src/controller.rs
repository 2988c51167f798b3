//! Generation job controller.
//!
//! Drives one generation run at a time through
//! `Idle -> Submitting -> Polling -> {Completed | Failed | TimedOut}`.
//!
//! The run executes on a spawned task owned by a [`PollHandle`]. Starting a new
//! run, calling [`JobController::cancel`], or dropping the controller cancels the
//! handle. Every state write is checked against the live snapshot (same run id,
//! not yet terminal), so a stale task can never move the state after a newer run
//! began or after a terminal transition was recorded.

use std::sync::Arc;

use promogen_api_client::{ApiError, GenerationBackend};
use promogen_core::error::{DEFAULT_REMOTE_FAILURE, DEFAULT_SUBMISSION_ERROR};
use promogen_core::models::{AssetResult, GenerationRequest, GlobalSettings, JobStatus};
use promogen_core::{GenerationError, JobTimings, OutputSpecRegistry};
use tokio::sync::watch;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::store::AssetStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

impl JobPhase {
    /// No self-transition happens from a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed | JobPhase::TimedOut)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, JobPhase::Submitting | JobPhase::Polling)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Submitting => "submitting",
            JobPhase::Polling => "polling",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
            JobPhase::TimedOut => "timed_out",
        }
    }
}

/// Observable state of the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    /// Increments with every accepted generate request; 0 before the first.
    pub run_id: u64,
    pub job_id: Option<String>,
    pub phase: JobPhase,
    /// Status queries issued during the current run.
    pub polls: u32,
    /// Set when the run ended in `Failed` or `TimedOut`.
    pub error: Option<GenerationError>,
}

impl JobSnapshot {
    fn idle() -> Self {
        Self {
            run_id: 0,
            job_id: None,
            phase: JobPhase::Idle,
            polls: 0,
            error: None,
        }
    }
}

/// Cancellable handle to the task running a generation.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub struct JobController {
    backend: Arc<dyn GenerationBackend>,
    timings: JobTimings,
    state: Arc<watch::Sender<JobSnapshot>>,
    store: AssetStore,
    active: Option<PollHandle>,
    next_run_id: u64,
}

impl JobController {
    pub fn new(backend: Arc<dyn GenerationBackend>, timings: JobTimings) -> Self {
        let (state, _rx) = watch::channel(JobSnapshot::idle());
        Self {
            backend,
            timings,
            state: Arc::new(state),
            store: AssetStore::new(),
            active: None,
            next_run_id: 1,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.state.borrow().clone()
    }

    pub fn assets(&self) -> &AssetStore {
        &self.store
    }

    pub fn timings(&self) -> JobTimings {
        self.timings
    }

    /// Start a new generation run and return its run id.
    ///
    /// Preconditions are checked before anything else: without a job id this fails
    /// with `NoUpload`, without an enabled output with `NoOutputsSelected`. On such
    /// failures nothing is cancelled, no request is made and the state is untouched.
    ///
    /// Otherwise any run in flight is cancelled, the asset store is cleared and a
    /// new run is spawned. Must be called from within a tokio runtime.
    pub fn generate(
        &mut self,
        job_id: Option<&str>,
        registry: &OutputSpecRegistry,
        settings: GlobalSettings,
    ) -> Result<u64, GenerationError> {
        let job_id = match job_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                tracing::debug!("Generate rejected: no upload");
                return Err(GenerationError::NoUpload);
            }
        };
        let request = GenerationRequest::build(&job_id, registry.specs(), settings)
            .inspect_err(|e| tracing::debug!(error = %e, "Generate rejected"))?;

        if let Some(previous) = self.active.take() {
            previous.cancel();
        }

        let run_id = self.next_run_id;
        self.next_run_id += 1;

        // Cleared under the state lock, so a superseded run's completion either
        // lands before the clear or sees the new run id and is dropped.
        let store = &self.store;
        self.state.send_modify(|s| {
            store.clear();
            *s = JobSnapshot {
                run_id,
                job_id: Some(job_id.clone()),
                phase: JobPhase::Submitting,
                polls: 0,
                error: None,
            };
        });

        tracing::info!(
            run_id,
            job_id = %job_id,
            outputs = request.outputs.len(),
            "Generation run started"
        );

        let token = CancellationToken::new();
        let ctx = RunContext {
            run_id,
            job_id,
            backend: self.backend.clone(),
            timings: self.timings,
            state: self.state.clone(),
            store: self.store.clone(),
            cancel: token.clone(),
        };
        tokio::spawn(run(ctx, request));
        self.active = Some(PollHandle { token });

        Ok(run_id)
    }

    /// Cancel the run in flight, if any. An active run returns to `Idle`;
    /// terminal phases are left as they are.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
        self.state.send_if_modified(|s| {
            if !s.phase.is_active() {
                return false;
            }
            tracing::info!(run_id = s.run_id, "Generation run cancelled");
            s.phase = JobPhase::Idle;
            true
        });
    }

    /// Resolve once the controller is not submitting or polling.
    pub async fn wait_for_terminal(&self) -> JobSnapshot {
        let mut rx = self.state.subscribe();
        let result = rx.wait_for(|s| !s.phase.is_active()).await;
        match result {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

struct RunContext {
    run_id: u64,
    job_id: String,
    backend: Arc<dyn GenerationBackend>,
    timings: JobTimings,
    state: Arc<watch::Sender<JobSnapshot>>,
    store: AssetStore,
    cancel: CancellationToken,
}

impl RunContext {
    /// Apply `f` only if this run is still current and not terminal.
    fn update(&self, f: impl FnOnce(&mut JobSnapshot)) -> bool {
        self.state.send_if_modified(|s| {
            if s.run_id != self.run_id || s.phase.is_terminal() || s.phase == JobPhase::Idle {
                return false;
            }
            f(s);
            true
        })
    }

    fn enter_polling(&self) -> bool {
        self.update(|s| s.phase = JobPhase::Polling)
    }

    fn record_poll(&self) -> bool {
        self.update(|s| s.polls += 1)
    }

    fn fail(&self, error: GenerationError) -> bool {
        self.update(|s| {
            s.phase = JobPhase::Failed;
            s.error = Some(error);
        })
    }

    fn time_out(&self) -> bool {
        let after_ms = self.timings.poll_timeout.as_millis() as u64;
        self.update(|s| {
            s.phase = JobPhase::TimedOut;
            s.error = Some(GenerationError::TimedOut { after_ms });
        })
    }

    /// Publish the batch and the `Completed` transition together.
    fn complete(&self, assets: Vec<AssetResult>) -> bool {
        let store = &self.store;
        self.update(move |s| {
            store.replace(assets);
            s.phase = JobPhase::Completed;
        })
    }
}

enum PollOutcome {
    Completed,
    RemoteFailed(Option<String>),
    Transport(String),
    TimedOut,
    Superseded,
}

async fn run(ctx: RunContext, request: GenerationRequest) {
    let submitted = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => return,
        result = ctx.backend.submit(&request) => result,
    };

    if let Err(e) = submitted {
        tracing::error!(
            run_id = ctx.run_id,
            job_id = %ctx.job_id,
            error = %e,
            "Generation submission failed"
        );
        ctx.fail(GenerationError::SubmissionFailed(submission_message(&e)));
        return;
    }

    if !ctx.enter_polling() {
        return;
    }
    tracing::info!(
        run_id = ctx.run_id,
        job_id = %ctx.job_id,
        interval_ms = ctx.timings.poll_interval.as_millis() as u64,
        timeout_ms = ctx.timings.poll_timeout.as_millis() as u64,
        "Generation accepted, polling job status"
    );

    match poll_until_terminal(&ctx).await {
        PollOutcome::Completed => fetch_results(&ctx).await,
        PollOutcome::RemoteFailed(message) => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REMOTE_FAILURE.to_string());
            tracing::warn!(
                run_id = ctx.run_id,
                job_id = %ctx.job_id,
                error = %message,
                "Remote job failed"
            );
            ctx.fail(GenerationError::RemoteJobFailed(message));
        }
        PollOutcome::Transport(detail) => {
            tracing::error!(
                run_id = ctx.run_id,
                job_id = %ctx.job_id,
                error = %detail,
                "Job status query failed"
            );
            ctx.fail(GenerationError::PollingTransportError(detail));
        }
        PollOutcome::TimedOut => {
            if ctx.time_out() {
                tracing::warn!(
                    run_id = ctx.run_id,
                    job_id = %ctx.job_id,
                    "Generation timed out"
                );
            }
        }
        PollOutcome::Superseded => {
            tracing::debug!(run_id = ctx.run_id, "Generation run superseded");
        }
    }
}

/// Query job status every interval until a terminal status, a transport error,
/// cancellation, or the hard deadline. The deadline wins a tie with a tick.
async fn poll_until_terminal(ctx: &RunContext) -> PollOutcome {
    let start = Instant::now();
    let deadline = sleep_until(start + ctx.timings.poll_timeout);
    tokio::pin!(deadline);

    let mut ticker = interval_at(start + ctx.timings.poll_interval, ctx.timings.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return PollOutcome::Superseded,
            _ = &mut deadline => return PollOutcome::TimedOut,
            _ = ticker.tick() => {}
        }

        if !ctx.record_poll() {
            return PollOutcome::Superseded;
        }

        let response = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return PollOutcome::Superseded,
            _ = &mut deadline => return PollOutcome::TimedOut,
            response = ctx.backend.job_status(&ctx.job_id) => response,
        };

        match response {
            Ok(status) => match status.status {
                JobStatus::Completed => return PollOutcome::Completed,
                JobStatus::Failed => return PollOutcome::RemoteFailed(status.error),
                JobStatus::Pending => {
                    tracing::debug!(run_id = ctx.run_id, job_id = %ctx.job_id, "Job still pending");
                }
            },
            Err(e) => return PollOutcome::Transport(e.detail()),
        }
    }
}

async fn fetch_results(ctx: &RunContext) {
    let fetched = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => return,
        result = ctx.backend.job_assets(&ctx.job_id) => result,
    };

    match fetched {
        Ok(assets) => {
            let count = assets.len();
            if ctx.complete(assets) {
                tracing::info!(
                    run_id = ctx.run_id,
                    job_id = %ctx.job_id,
                    assets = count,
                    "Generation completed"
                );
            }
        }
        Err(e) => {
            tracing::error!(
                run_id = ctx.run_id,
                job_id = %ctx.job_id,
                error = %e,
                "Failed to fetch generated assets"
            );
            ctx.fail(GenerationError::PollingTransportError(format!(
                "failed to fetch assets: {}",
                e.detail()
            )));
        }
    }
}

fn submission_message(e: &ApiError) -> String {
    match e {
        ApiError::Status { detail, .. } if !detail.trim().is_empty() => detail.clone(),
        _ => DEFAULT_SUBMISSION_ERROR.to_string(),
    }
}
