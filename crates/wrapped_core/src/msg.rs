use std::time::Duration;

use crate::{AnalyzeResponse, FlowError, JobId, StatsResponse, StatusResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked to analyze a job with the given participant selection.
    StartRequested {
        job_id: JobId,
        selection: Vec<String>,
    },
    /// Backend accepted the analyze request.
    AnalysisStarted(AnalyzeResponse),
    /// One status check finished. `elapsed` is time since the flow started.
    StatusReceived {
        response: StatusResponse,
        elapsed: Duration,
    },
    /// Stats for a completed job arrived.
    StatsReceived(StatsResponse),
    /// A gateway call failed.
    RequestFailed(FlowError),
    /// Caller abandoned the flow.
    Cancelled,
}
