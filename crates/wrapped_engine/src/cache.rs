use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wrapped_core::{JobId, Metadata, Stats};
use wrapped_logging::{wrapped_debug, wrapped_info, wrapped_warn};

use crate::session::{CACHE_KEY, JOB_ID_KEY, PARTICIPANTS_KEY};
use crate::storage::{KeyValueStore, StorageError};

/// How long a cached result stays usable.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Wall clock in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// The single cached result of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub stats: Stats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub timestamp: i64,
    #[serde(rename = "jobId")]
    pub job_id: JobId,
}

/// Why a stored entry cannot be used. Never shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum CacheCorruption {
    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("malformed entry: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("expired {age_ms}ms after being written")]
    Expired { age_ms: i64 },
    #[error("entry has no slides")]
    Empty,
}

/// Single-slot, time-bounded cache of a completed job's results.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), CACHE_TTL)
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// True iff a well-formed, unexpired entry with slides exists. Any other
    /// stored entry is purged.
    pub fn is_valid(&self) -> bool {
        self.load_valid().is_some()
    }

    /// The entry if it is valid; otherwise purges whatever is stored.
    pub fn load_valid(&self) -> Option<CacheEntry> {
        match self.inspect() {
            Ok(Some(entry)) => {
                wrapped_debug!("cache hit for job {}", entry.job_id);
                Some(entry)
            }
            Ok(None) => {
                wrapped_debug!("cache miss");
                None
            }
            Err(reason) => {
                wrapped_info!("discarding cached result: {}", reason);
                self.clear();
                None
            }
        }
    }

    /// Best-effort read without validation. Malformed storage yields `None`.
    pub fn get(&self) -> Option<CacheEntry> {
        match self.read() {
            Ok(entry) => entry,
            Err(reason) => {
                wrapped_debug!("cache read failed: {}", reason);
                None
            }
        }
    }

    /// Overwrites the slot, stamped with the current time.
    pub fn set(&self, stats: &Stats, metadata: Option<&Metadata>, job_id: &str) {
        let entry = CacheEntry {
            stats: stats.clone(),
            metadata: metadata.cloned(),
            timestamp: self.clock.now_millis(),
            job_id: job_id.to_string(),
        };
        let encoded = match serde_json::to_string(&entry) {
            Ok(encoded) => encoded,
            Err(err) => {
                wrapped_warn!("could not encode cache entry for job {}: {}", job_id, err);
                return;
            }
        };
        // Write failures are logged only; the next visit refetches.
        match self.store.set(CACHE_KEY, &encoded) {
            Ok(()) => wrapped_info!(
                "cached {} slides for job {}",
                entry.stats.slides.len(),
                job_id
            ),
            Err(err) => wrapped_warn!("could not cache result for job {}: {}", job_id, err),
        }
    }

    /// Removes the entry and the session's job id and participants. Idempotent.
    pub fn clear(&self) {
        for key in [CACHE_KEY, JOB_ID_KEY, PARTICIPANTS_KEY] {
            if let Err(err) = self.store.remove(key) {
                wrapped_warn!("could not remove {}: {}", key, err);
            }
        }
    }

    fn read(&self) -> Result<Option<CacheEntry>, CacheCorruption> {
        let Some(raw) = self.store.get(CACHE_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn inspect(&self) -> Result<Option<CacheEntry>, CacheCorruption> {
        let Some(entry) = self.read()? else {
            return Ok(None);
        };
        let age_ms = self.clock.now_millis() - entry.timestamp;
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms >= ttl_ms {
            return Err(CacheCorruption::Expired { age_ms });
        }
        if entry.stats.slides.is_empty() {
            return Err(CacheCorruption::Empty);
        }
        Ok(Some(entry))
    }
}
