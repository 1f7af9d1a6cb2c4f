use std::path::Path;

use wrapped_core::FlowError;

/// A chat export to upload, already checked by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub year: i32,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, contents: Vec<u8>, year: i32) -> Self {
        Self {
            file_name: file_name.into(),
            contents,
            year,
        }
    }

    /// Uses the last path component as the uploaded file name.
    pub fn from_path(path: &Path, contents: Vec<u8>, year: i32) -> Self {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("chat.txt")
            .to_string();
        Self::new(file_name, contents, year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Non-success HTTP status. `detail` is the backend's `error` field, if any.
    #[error("http status {status} {reason}")]
    Transport {
        status: u16,
        reason: String,
        detail: Option<String>,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport { .. } | ApiError::Network(_) | ApiError::Timeout
        )
    }
}

impl From<ApiError> for FlowError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport {
                status,
                reason,
                detail,
            } => FlowError::Transport {
                status: Some(status),
                reason: match detail {
                    Some(detail) => format!("{reason}: {detail}"),
                    None => reason,
                },
            },
            ApiError::Network(message) => FlowError::Transport {
                status: None,
                reason: message,
            },
            ApiError::Timeout => FlowError::Transport {
                status: None,
                reason: "request timed out".to_string(),
            },
            ApiError::Decode(message) => FlowError::Decode(message),
            ApiError::InvalidBaseUrl(message) => FlowError::Transport {
                status: None,
                reason: format!("invalid api base url: {message}"),
            },
        }
    }
}
