use std::time::Duration;

use crate::job::JobStatus;

/// Caller-side precondition failures. These never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("select at least one participant")]
    EmptySelection,
    #[error("no job to analyze; upload a chat first")]
    MissingJobId,
}

/// Why an analysis flow stopped without results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request failed: {reason}")]
    Transport { status: Option<u16>, reason: String },
    #[error("unreadable response: {0}")]
    Decode(String),
    #[error("unexpected job status `{0}`")]
    UnexpectedStatus(JobStatus),
    #[error("analysis failed: {message}")]
    JobFailed { message: String },
    #[error("gave up polling after {0:?}")]
    TimedOut(Duration),
    #[error("cancelled")]
    Cancelled,
}

impl FlowError {
    /// Text shown to the user when the flow stops.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Validation(err) => err.to_string(),
            FlowError::Transport {
                status: Some(status),
                reason,
            } => format!("{status} {reason}"),
            FlowError::Transport { status: None, reason } => reason.clone(),
            FlowError::Decode(_) | FlowError::UnexpectedStatus(_) => {
                "Something went wrong talking to the server.".to_string()
            }
            FlowError::JobFailed { message } => message.clone(),
            FlowError::TimedOut(_) => "The analysis is taking too long.".to_string(),
            FlowError::Cancelled => "Cancelled.".to_string(),
        }
    }

    /// Whether starting the whole flow again may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FlowError::Validation(_) | FlowError::Cancelled)
    }
}
