use std::time::Duration;

use crate::error::FlowError;
use crate::job::{JobId, StatusResponse};
use crate::view_model::PollerView;

/// Fixed delay between status checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound on total polling time. `None` polls until the backend
    /// reports a terminal status.
    pub max_duration: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_duration: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Starting,
    Polling,
    Completed,
    Failed,
}

/// Observable state of one analysis job run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollerState {
    settings: PollSettings,
    phase: Phase,
    job_id: Option<JobId>,
    progress: u8,
    current_step: Option<String>,
    polls: u32,
    awaiting_stats: bool,
    error: Option<FlowError>,
    dirty: bool,
}

impl PollerState {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn view(&self) -> PollerView {
        PollerView {
            phase: self.phase,
            job_id: self.job_id.clone(),
            progress: self.progress,
            current_step: self.current_step.clone(),
            polls: self.polls,
            error: self.error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, job_id: &str) -> bool {
        self.job_id.as_deref() == Some(job_id)
    }

    pub(crate) fn awaiting_stats(&self) -> bool {
        self.awaiting_stats
    }

    pub(crate) fn reject(&mut self, error: FlowError) {
        self.error = Some(error);
        self.dirty = true;
    }

    pub(crate) fn begin(&mut self, job_id: JobId) {
        self.phase = Phase::Starting;
        self.job_id = Some(job_id);
        self.error = None;
        self.progress = 0;
        self.current_step = None;
        self.dirty = true;
    }

    pub(crate) fn enter_polling(&mut self) {
        self.phase = Phase::Polling;
        self.dirty = true;
    }

    pub(crate) fn apply_status(&mut self, status: &StatusResponse) {
        self.polls += 1;
        if let Some(progress) = status.progress {
            self.progress = progress.min(100) as u8;
        }
        if let Some(step) = &status.current_step {
            self.current_step = Some(step.clone());
        }
        self.dirty = true;
    }

    pub(crate) fn request_stats(&mut self) {
        self.awaiting_stats = true;
        self.dirty = true;
    }

    pub(crate) fn complete(&mut self) {
        self.phase = Phase::Completed;
        self.awaiting_stats = false;
        self.progress = 100;
        self.dirty = true;
    }

    pub(crate) fn fail(&mut self, error: FlowError) {
        self.phase = Phase::Failed;
        self.awaiting_stats = false;
        self.error = Some(error);
        self.dirty = true;
    }
}
