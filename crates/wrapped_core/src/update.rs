use std::time::Duration;

use crate::{
    Effect, FlowError, JobStatus, Msg, Phase, PollerState, StatsResponse, StatusResponse,
    ValidationError,
};

const JOB_FAILED: &str = "Analysis failed";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase are dropped, so every
/// transition happens at most once and terminal phases never emit effects.
pub fn update(mut state: PollerState, msg: Msg) -> (PollerState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { job_id, selection } => {
            if state.phase() != Phase::Idle {
                return (state, Vec::new());
            }
            let rejected = if job_id.trim().is_empty() {
                Some(ValidationError::MissingJobId)
            } else if selection.is_empty() {
                Some(ValidationError::EmptySelection)
            } else {
                None
            };
            match rejected {
                Some(err) => {
                    let err = FlowError::from(err);
                    state.reject(err.clone());
                    vec![Effect::ReportFailure(err)]
                }
                None => {
                    state.begin(job_id.clone());
                    vec![Effect::StartAnalysis {
                        job_id,
                        selected_members: selection,
                    }]
                }
            }
        }
        Msg::AnalysisStarted(response) => {
            if state.phase() != Phase::Starting {
                return (state, Vec::new());
            }
            if response.status == JobStatus::Pending {
                state.enter_polling();
                let job_id = state.job_id().unwrap_or(&response.job_id).to_string();
                vec![Effect::PollStatus {
                    job_id,
                    delay: Duration::ZERO,
                }]
            } else {
                fail(&mut state, FlowError::UnexpectedStatus(response.status))
            }
        }
        Msg::StatusReceived { response, elapsed } => {
            if state.phase() != Phase::Polling
                || state.awaiting_stats()
                || !state.is_current(&response.job_id)
            {
                return (state, Vec::new());
            }
            apply_status(&mut state, response, elapsed)
        }
        Msg::StatsReceived(response) => {
            if state.phase() != Phase::Polling
                || !state.awaiting_stats()
                || !state.is_current(&response.job_id)
            {
                return (state, Vec::new());
            }
            apply_stats(&mut state, response)
        }
        Msg::RequestFailed(err) => match state.phase() {
            Phase::Starting | Phase::Polling => fail(&mut state, err),
            Phase::Idle | Phase::Completed | Phase::Failed => Vec::new(),
        },
        Msg::Cancelled => {
            if matches!(state.phase(), Phase::Starting | Phase::Polling) {
                state.fail(FlowError::Cancelled);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn fail(state: &mut PollerState, err: FlowError) -> Vec<Effect> {
    state.fail(err.clone());
    vec![Effect::ReportFailure(err)]
}

fn apply_status(state: &mut PollerState, response: StatusResponse, elapsed: Duration) -> Vec<Effect> {
    state.apply_status(&response);
    let job_id = response.job_id;
    match response.status {
        JobStatus::Completed => {
            state.request_stats();
            vec![Effect::FetchStats { job_id }]
        }
        JobStatus::Failed => {
            // `current_step` is the last progress label, not a failure reason.
            let message = match response.current_step.as_deref().map(str::trim) {
                Some(step) if !step.is_empty() => format!("{JOB_FAILED} (at: {step})"),
                _ => JOB_FAILED.to_string(),
            };
            fail(state, FlowError::JobFailed { message })
        }
        JobStatus::Pending
        | JobStatus::AwaitingSelection
        | JobStatus::Analyzing
        | JobStatus::Unknown(_) => {
            let settings = state.settings();
            match settings.max_duration {
                Some(limit) if elapsed >= limit => fail(state, FlowError::TimedOut(elapsed)),
                _ => vec![Effect::PollStatus {
                    job_id,
                    delay: settings.interval,
                }],
            }
        }
    }
}

fn apply_stats(state: &mut PollerState, response: StatsResponse) -> Vec<Effect> {
    let metadata = response.effective_metadata().cloned();
    let StatsResponse {
        job_id,
        stats,
        status,
        error,
        ..
    } = response;

    let stats = stats.unwrap_or_default();
    if status == JobStatus::Failed || stats.slides.is_empty() {
        let message = error.unwrap_or_else(|| "Results not available".to_string());
        return fail(state, FlowError::JobFailed { message });
    }

    state.complete();
    vec![
        Effect::StoreResult {
            job_id: job_id.clone(),
            stats,
            metadata,
        },
        Effect::HandOff { job_id },
    ]
}
