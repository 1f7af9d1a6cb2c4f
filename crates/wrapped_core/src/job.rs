use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::slide::SlideRecord;

pub type JobId = String;

/// Free-form keyed metadata attached to a job's results.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Backend job status. Unknown strings are kept verbatim so a newer backend
/// does not break decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    AwaitingSelection,
    Analyzing,
    Completed,
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::AwaitingSelection => "awaiting_selection",
            JobStatus::Analyzing => "analyzing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn from_wire(raw: &str) -> Self {
        match raw {
            "pending" => JobStatus::Pending,
            "awaiting_selection" => JobStatus::AwaitingSelection,
            // The backend reports `processing` for the analyzing stage.
            "analyzing" | "processing" => JobStatus::Analyzing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from_wire(&raw))
    }
}

/// `POST /upload` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub job_id: JobId,
    #[serde(default)]
    pub participants: Vec<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// `POST /analyze` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub job_id: &'a str,
    pub selected_members: &'a [String],
}

/// `POST /analyze` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub job_id: JobId,
    #[serde(default)]
    pub message: String,
    pub status: JobStatus,
}

/// `GET /jobs/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The computed statistics of a completed job.
///
/// Keys other than `slides` and `metadata` are carried through untouched so a
/// cached copy reproduces what the backend sent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub slides: Vec<SlideRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Stats {
    pub fn new(slides: Vec<SlideRecord>) -> Self {
        Self {
            slides,
            ..Self::default()
        }
    }
}

/// `GET /jobs/{id}/stats` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub job_id: JobId,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub stats: Option<Stats>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatsResponse {
    /// Response metadata, falling back to the copy embedded in `stats`.
    pub fn effective_metadata(&self) -> Option<&Metadata> {
        self.metadata
            .as_ref()
            .or_else(|| self.stats.as_ref().and_then(|stats| stats.metadata.as_ref()))
    }
}
