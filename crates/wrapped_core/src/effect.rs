use std::time::Duration;

use crate::{FlowError, JobId, Metadata, Stats};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartAnalysis {
        job_id: JobId,
        selected_members: Vec<String>,
    },
    /// Check status once after `delay`.
    PollStatus { job_id: JobId, delay: Duration },
    FetchStats { job_id: JobId },
    /// Write the completed result to the result cache.
    StoreResult {
        job_id: JobId,
        stats: Stats,
        metadata: Option<Metadata>,
    },
    /// Hand the stored result to the caller.
    HandOff { job_id: JobId },
    ReportFailure(FlowError),
}
