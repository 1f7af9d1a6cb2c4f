//! Wrapped engine: backend gateway, storage and effect execution.
mod api;
mod cache;
mod persist;
mod poller;
mod session;
mod storage;
mod types;

pub use api::{ApiGateway, ApiSettings, ReqwestApi, DEFAULT_API_BASE};
pub use cache::{CacheCorruption, CacheEntry, Clock, ResultCache, SystemClock, CACHE_TTL};
pub use persist::RonFileStore;
pub use poller::{CompletedJob, NullSink, PollRunner, ProgressSink};
pub use session::{SessionStore, CACHE_KEY, JOB_ID_KEY, PARTICIPANTS_KEY, SLIDE_INDEX_KEY};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use types::{ApiError, UploadRequest};
