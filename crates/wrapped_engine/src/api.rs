use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use wrapped_core::{AnalyzeRequest, AnalyzeResponse, StatsResponse, StatusResponse, UploadResponse};
use wrapped_logging::{wrapped_debug, wrapped_warn};

use crate::{ApiError, UploadRequest};

/// Backend default when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The four backend operations. Each call is one request/response cycle.
#[async_trait::async_trait]
pub trait ApiGateway: Send + Sync {
    async fn upload(&self, upload: UploadRequest) -> Result<UploadResponse, ApiError>;

    /// `selected_members` must be a non-empty subset of the uploaded
    /// participants; callers check this.
    async fn start_analysis(
        &self,
        job_id: &str,
        selected_members: &[String],
    ) -> Result<AnalyzeResponse, ApiError>;

    async fn get_status(&self, job_id: &str) -> Result<StatusResponse, ApiError>;

    /// Only meaningful once the job is `completed`.
    async fn get_stats(&self, job_id: &str) -> Result<StatsResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::InvalidBaseUrl(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(settings.base_url));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait::async_trait]
impl ApiGateway for ReqwestApi {
    async fn upload(&self, upload: UploadRequest) -> Result<UploadResponse, ApiError> {
        let url = self.endpoint(&["upload"]);
        wrapped_debug!(
            "POST {} file={} bytes={} year={}",
            url.path(),
            upload.file_name,
            upload.contents.len(),
            upload.year
        );
        let file = Part::bytes(upload.contents)
            .file_name(upload.file_name)
            .mime_str("text/plain")
            .map_err(map_reqwest_error)?;
        let form = Form::new()
            .part("file", file)
            .text("year", upload.year.to_string());

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }

    async fn start_analysis(
        &self,
        job_id: &str,
        selected_members: &[String],
    ) -> Result<AnalyzeResponse, ApiError> {
        let url = self.endpoint(&["analyze"]);
        wrapped_debug!(
            "POST {} job_id={} members={}",
            url.path(),
            job_id,
            selected_members.len()
        );
        let body = AnalyzeRequest {
            job_id,
            selected_members,
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusResponse, ApiError> {
        let url = self.endpoint(&["jobs", job_id]);
        wrapped_debug!("GET {}", url.path());
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        decode(response).await
    }

    async fn get_stats(&self, job_id: &str) -> Result<StatsResponse, ApiError> {
        let url = self.endpoint(&["jobs", job_id, "stats"]);
        wrapped_debug!("GET {}", url.path());
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        decode(response).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error);
        let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
        wrapped_warn!("request failed with {} {} ({:?})", status.as_u16(), reason, detail);
        return Err(ApiError::Transport {
            status: status.as_u16(),
            reason,
            detail,
        });
    }

    serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
