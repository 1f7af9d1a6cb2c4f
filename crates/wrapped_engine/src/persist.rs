use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use wrapped_logging::{wrapped_info, wrapped_warn};

use crate::storage::{KeyValueStore, StorageError};

/// Key-value store persisted as a RON map in one file.
///
/// Every write rewrites the file through a temp file and rename, so a reader
/// sees either the old or the new contents. The in-memory map only changes
/// once the file has been replaced.
#[derive(Debug)]
pub struct RonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl RonFileStore {
    /// Opens the store at `path`. A missing file starts empty; an unreadable
    /// or unparsable one is logged and also starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(entries, pretty)
            .map_err(|err| StorageError::Serialize(err.to_string()))?;
        write_atomic(&self.path, &content)
    }
}

impl KeyValueStore for RonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return BTreeMap::new();
        }
        Err(err) => {
            wrapped_warn!("Failed to read session state from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };

    match ron::from_str(&content) {
        Ok(entries) => {
            wrapped_info!("Loaded session state from {:?}", path);
            entries
        }
        Err(err) => {
            wrapped_warn!("Failed to parse session state from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}

/// Atomically replaces `path` by writing a sibling temp file then renaming.
fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|err| StorageError::Io(err.error))?;
    Ok(())
}
