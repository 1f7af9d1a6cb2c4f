use crate::{FlowError, JobId, Phase};

/// Snapshot of a poller run for progress display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollerView {
    pub phase: Phase,
    pub job_id: Option<JobId>,
    pub progress: u8,
    pub current_step: Option<String>,
    pub polls: u32,
    pub error: Option<FlowError>,
    pub dirty: bool,
}
