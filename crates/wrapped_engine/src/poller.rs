use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use wrapped_core::{
    update, Effect, FlowError, JobId, Metadata, Msg, PollSettings, PollerState, PollerView, Stats,
};
use wrapped_logging::{wrapped_debug, wrapped_info, wrapped_warn};

use crate::api::ApiGateway;
use crate::cache::ResultCache;
use crate::ApiError;

/// Receives a view each time the poller state changes.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, view: &PollerView);
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _view: &PollerView) {}
}

/// Result handed to the caller once a job completes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedJob {
    pub job_id: JobId,
    pub stats: Stats,
    pub metadata: Option<Metadata>,
}

/// Executes poller effects against the gateway and the result cache.
///
/// Effects run strictly one after another, so at most one status request is
/// in flight and the next poll is only scheduled once the previous response
/// has been applied.
pub struct PollRunner {
    api: Arc<dyn ApiGateway>,
    cache: ResultCache,
    settings: PollSettings,
}

impl PollRunner {
    pub fn new(api: Arc<dyn ApiGateway>, cache: ResultCache, settings: PollSettings) -> Self {
        Self {
            api,
            cache,
            settings,
        }
    }

    /// Starts analysis of `job_id` and polls until the job is terminal or
    /// `cancel` fires.
    pub async fn run(
        &self,
        job_id: JobId,
        selection: Vec<String>,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<CompletedJob, FlowError> {
        let started = Instant::now();
        let mut queue = VecDeque::new();
        let mut stored: Option<CompletedJob> = None;
        let mut outcome: Option<Result<CompletedJob, FlowError>> = None;

        let mut state = self.step(
            PollerState::new(self.settings),
            Msg::StartRequested { job_id, selection },
            &mut queue,
            sink,
        );

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::StartAnalysis {
                    job_id,
                    selected_members,
                } => {
                    wrapped_info!(
                        "starting analysis job_id={} members={}",
                        job_id,
                        selected_members.len()
                    );
                    let call = self.api.start_analysis(&job_id, &selected_members);
                    match cancellable(cancel, call).await {
                        Some(Ok(response)) => Msg::AnalysisStarted(response),
                        Some(Err(err)) => failed(err),
                        None => Msg::Cancelled,
                    }
                }
                Effect::PollStatus { job_id, delay } => {
                    let waited = tokio::select! {
                        _ = cancel.cancelled() => false,
                        _ = sleep(delay) => true,
                    };
                    if !waited {
                        Msg::Cancelled
                    } else {
                        match cancellable(cancel, self.api.get_status(&job_id)).await {
                            Some(Ok(response)) => Msg::StatusReceived {
                                response,
                                elapsed: started.elapsed(),
                            },
                            Some(Err(err)) => failed(err),
                            None => Msg::Cancelled,
                        }
                    }
                }
                Effect::FetchStats { job_id } => {
                    wrapped_info!("job {} completed, fetching stats", job_id);
                    match cancellable(cancel, self.api.get_stats(&job_id)).await {
                        Some(Ok(response)) => Msg::StatsReceived(response),
                        Some(Err(err)) => failed(err),
                        None => Msg::Cancelled,
                    }
                }
                Effect::StoreResult {
                    job_id,
                    stats,
                    metadata,
                } => {
                    self.cache.set(&stats, metadata.as_ref(), &job_id);
                    stored = Some(CompletedJob {
                        job_id,
                        stats,
                        metadata,
                    });
                    continue;
                }
                Effect::HandOff { job_id } => {
                    wrapped_debug!("handing off job {}", job_id);
                    outcome = stored.take().map(Ok);
                    continue;
                }
                Effect::ReportFailure(err) => {
                    wrapped_warn!("analysis flow stopped: {}", err);
                    outcome = Some(Err(err));
                    continue;
                }
            };
            state = self.step(state, msg, &mut queue, sink);
        }

        outcome.unwrap_or_else(|| Err(state.view().error.unwrap_or(FlowError::Cancelled)))
    }

    fn step(
        &self,
        state: PollerState,
        msg: Msg,
        queue: &mut VecDeque<Effect>,
        sink: &dyn ProgressSink,
    ) -> PollerState {
        let before = state.phase();
        let (mut state, effects) = update(state, msg);
        if state.phase() != before {
            wrapped_debug!("poller {:?} -> {:?}", before, state.phase());
        }
        queue.extend(effects);
        if state.consume_dirty() {
            sink.emit(&state.view());
        }
        state
    }
}

fn failed(err: ApiError) -> Msg {
    Msg::RequestFailed(err.into())
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Option<Result<T, ApiError>> {
    tokio::select! {
        _ = cancel.cancelled() => None,
        result = call => Some(result),
    }
}
