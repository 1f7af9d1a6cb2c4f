use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wrapped_core::{JobId, Selection};
use wrapped_logging::wrapped_warn;

use crate::storage::{KeyValueStore, StorageError};

pub const CACHE_KEY: &str = "wrappedStatsCache";
pub const JOB_ID_KEY: &str = "wrappedJobId";
pub const PARTICIPANTS_KEY: &str = "wrappedParticipants";
pub const SLIDE_INDEX_KEY: &str = "wrappedCurrentStory";

/// JSON-encoded session keys. Absent or unreadable keys read as "no session".
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.read(JOB_ID_KEY)
    }

    pub fn set_job_id(&self, job_id: &str) -> Result<(), StorageError> {
        self.write(JOB_ID_KEY, job_id)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.read(PARTICIPANTS_KEY)
    }

    pub fn set_selection(&self, selection: &Selection) -> Result<(), StorageError> {
        self.write(PARTICIPANTS_KEY, selection)
    }

    pub fn slide_index(&self) -> Option<usize> {
        self.read(SLIDE_INDEX_KEY)
    }

    pub fn set_slide_index(&self, index: usize) -> Result<(), StorageError> {
        self.write(SLIDE_INDEX_KEY, &index)
    }

    pub fn clear_slide_index(&self) -> Result<(), StorageError> {
        self.store.remove(SLIDE_INDEX_KEY)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                wrapped_warn!("could not read {}: {}", key, err);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                wrapped_warn!("ignoring unreadable {}: {}", key, err);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string(value).map_err(|err| StorageError::Serialize(err.to_string()))?;
        self.store.set(key, &encoded)
    }
}
