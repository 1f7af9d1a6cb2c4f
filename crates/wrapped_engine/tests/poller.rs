use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::Map;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wrapped_core::{
    AnalyzeResponse, FlowError, JobStatus, Phase, PollSettings, PollerView, SlideRecord, Stats,
    StatsResponse, StatusResponse, UploadResponse, ValidationError,
};
use wrapped_engine::{
    ApiError, ApiGateway, KeyValueStore, MemoryStore, NullSink, PollRunner, ProgressSink,
    ResultCache, StorageError, UploadRequest, CACHE_KEY,
};

type Scripted = Result<StatusResponse, ApiError>;

/// Backend double that replays scripted status responses and records when
/// each request arrived.
struct ScriptedApi {
    start_status: JobStatus,
    statuses: Mutex<VecDeque<Scripted>>,
    slides: usize,
    origin: Instant,
    status_calls: Mutex<Vec<Duration>>,
    stats_calls: Mutex<usize>,
}

impl ScriptedApi {
    fn new(statuses: Vec<Scripted>) -> Arc<Self> {
        Self::with_start(JobStatus::Pending, statuses)
    }

    fn with_start(start_status: JobStatus, statuses: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            start_status,
            statuses: Mutex::new(statuses.into()),
            slides: 2,
            origin: Instant::now(),
            status_calls: Mutex::new(Vec::new()),
            stats_calls: Mutex::new(0),
        })
    }

    fn status_calls(&self) -> Vec<Duration> {
        self.status_calls.lock().unwrap().clone()
    }

    fn stats_calls(&self) -> usize {
        *self.stats_calls.lock().unwrap()
    }
}

#[async_trait]
impl ApiGateway for ScriptedApi {
    async fn upload(&self, _upload: UploadRequest) -> Result<UploadResponse, ApiError> {
        unreachable!("the poller never uploads")
    }

    async fn start_analysis(
        &self,
        job_id: &str,
        _selected_members: &[String],
    ) -> Result<AnalyzeResponse, ApiError> {
        Ok(AnalyzeResponse {
            job_id: job_id.to_string(),
            message: "Analysis started".to_string(),
            status: self.start_status.clone(),
        })
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusResponse, ApiError> {
        self.status_calls
            .lock()
            .unwrap()
            .push(self.origin.elapsed());
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(status(job_id, JobStatus::Analyzing, 50)))
    }

    async fn get_stats(&self, job_id: &str) -> Result<StatsResponse, ApiError> {
        *self.stats_calls.lock().unwrap() += 1;
        let slides = (0..self.slides)
            .map(|i| SlideRecord::new("overview", format!("Slide {i}"), Map::new()))
            .collect();
        Ok(StatsResponse {
            job_id: job_id.to_string(),
            metadata: None,
            stats: Some(Stats::new(slides)),
            status: JobStatus::Completed,
            error: None,
        })
    }
}

/// Memory store that counts writes to the cache key.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    cache_writes: Mutex<usize>,
}

impl CountingStore {
    fn cache_writes(&self) -> usize {
        *self.cache_writes.lock().unwrap()
    }
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == CACHE_KEY {
            *self.cache_writes.lock().unwrap() += 1;
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[derive(Default)]
struct RecordingSink {
    views: Mutex<Vec<PollerView>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, view: &PollerView) {
        self.views.lock().unwrap().push(view.clone());
    }
}

fn status(job_id: &str, status: JobStatus, progress: u32) -> StatusResponse {
    StatusResponse {
        job_id: job_id.to_string(),
        status,
        progress: Some(progress),
        current_step: Some(format!("step at {progress}")),
        created_at: None,
    }
}

fn runner(api: Arc<ScriptedApi>, store: Arc<CountingStore>, settings: PollSettings) -> PollRunner {
    PollRunner::new(api, ResultCache::new(store), settings)
}

fn members() -> Vec<String> {
    vec!["Ana".to_string(), "Ben".to_string()]
}

#[tokio::test(start_paused = true)]
async fn polls_once_per_interval_until_completed() {
    let api = ScriptedApi::new(vec![
        Ok(status("job-1", JobStatus::Pending, 0)),
        Ok(status("job-1", JobStatus::Analyzing, 60)),
        Ok(status("job-1", JobStatus::Completed, 100)),
    ]);
    let store = Arc::new(CountingStore::default());
    let sink = RecordingSink::default();

    let completed = runner(api.clone(), store.clone(), PollSettings::default())
        .run("job-1".into(), members(), &CancellationToken::new(), &sink)
        .await
        .expect("job completes");

    assert_eq!(completed.job_id, "job-1");
    assert_eq!(completed.stats.slides.len(), 2);
    let calls = api.status_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0] < Duration::from_millis(5));
    for pair in calls.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(1000), "polled after {gap:?}");
        assert!(gap < Duration::from_millis(1050), "polled after {gap:?}");
    }
    assert_eq!(api.stats_calls(), 1);
    assert_eq!(store.cache_writes(), 1);

    let views = sink.views.lock().unwrap();
    let last = views.last().expect("at least one view");
    assert_eq!(last.phase, Phase::Completed);
    assert_eq!(last.progress, 100);
}

#[tokio::test(start_paused = true)]
async fn failed_status_stops_polling_without_caching() {
    let api = ScriptedApi::new(vec![
        Ok(status("job-1", JobStatus::Analyzing, 20)),
        Ok(StatusResponse {
            current_step: Some("Counting emojis...".to_string()),
            ..status("job-1", JobStatus::Failed, 20)
        }),
    ]);
    let store = Arc::new(CountingStore::default());

    let err = runner(api.clone(), store.clone(), PollSettings::default())
        .run("job-1".into(), members(), &CancellationToken::new(), &NullSink)
        .await
        .expect_err("job fails");

    assert_eq!(
        err,
        FlowError::JobFailed {
            message: "Analysis failed (at: Counting emojis...)".to_string()
        }
    );
    assert_eq!(api.status_calls().len(), 2);
    assert_eq!(api.stats_calls(), 0);
    assert_eq!(store.cache_writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn transport_error_ends_the_flow() {
    let api = ScriptedApi::new(vec![
        Ok(status("job-1", JobStatus::Analyzing, 20)),
        Err(ApiError::Transport {
            status: 500,
            reason: "Internal Server Error".to_string(),
            detail: None,
        }),
    ]);
    let store = Arc::new(CountingStore::default());

    let err = runner(api.clone(), store, PollSettings::default())
        .run("job-1".into(), members(), &CancellationToken::new(), &NullSink)
        .await
        .expect_err("transport failure");

    assert_eq!(
        err,
        FlowError::Transport {
            status: Some(500),
            reason: "Internal Server Error".to_string()
        }
    );
    assert_eq!(api.status_calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_further_polls() {
    let api = ScriptedApi::new(Vec::new());
    let store = Arc::new(CountingStore::default());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let err = runner(api.clone(), store.clone(), PollSettings::default())
        .run("job-1".into(), members(), &cancel, &NullSink)
        .await
        .expect_err("cancelled");

    assert_eq!(err, FlowError::Cancelled);
    assert_eq!(api.status_calls().len(), 3);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(api.status_calls().len(), 3);
    assert_eq!(store.cache_writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn max_duration_gives_up() {
    let api = ScriptedApi::new(Vec::new());
    let store = Arc::new(CountingStore::default());
    let settings = PollSettings {
        max_duration: Some(Duration::from_secs(3)),
        ..PollSettings::default()
    };

    let err = runner(api.clone(), store, settings)
        .run("job-1".into(), members(), &CancellationToken::new(), &NullSink)
        .await
        .expect_err("times out");

    assert!(matches!(err, FlowError::TimedOut(_)));
    assert_eq!(api.status_calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn non_pending_start_is_rejected() {
    let api = ScriptedApi::with_start(JobStatus::Failed, Vec::new());
    let store = Arc::new(CountingStore::default());

    let err = runner(api.clone(), store, PollSettings::default())
        .run("job-1".into(), members(), &CancellationToken::new(), &NullSink)
        .await
        .expect_err("unexpected status");

    assert_eq!(err, FlowError::UnexpectedStatus(JobStatus::Failed));
    assert!(api.status_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_selection_never_reaches_the_backend() {
    let api = ScriptedApi::new(Vec::new());
    let store = Arc::new(CountingStore::default());

    let err = runner(api.clone(), store, PollSettings::default())
        .run("job-1".into(), Vec::new(), &CancellationToken::new(), &NullSink)
        .await
        .expect_err("validation");

    assert_eq!(err, FlowError::Validation(ValidationError::EmptySelection));
    assert!(api.status_calls().is_empty());
}
