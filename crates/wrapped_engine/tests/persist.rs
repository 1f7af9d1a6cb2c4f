use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use wrapped_core::Selection;
use wrapped_engine::{KeyValueStore, RonFileStore, SessionStore, SLIDE_INDEX_KEY};

#[test]
fn values_survive_reopening() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.ron");

    let store = RonFileStore::open(&path);
    store.set("wrappedJobId", "\"job-1\"").unwrap();
    store.set(SLIDE_INDEX_KEY, "3").unwrap();
    drop(store);

    let reopened = RonFileStore::open(&path);
    assert_eq!(
        reopened.get("wrappedJobId").unwrap().as_deref(),
        Some("\"job-1\"")
    );
    assert_eq!(reopened.get(SLIDE_INDEX_KEY).unwrap().as_deref(), Some("3"));
}

#[test]
fn missing_file_starts_empty_and_is_created_on_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("state.ron");

    let store = RonFileStore::open(&path);
    assert_eq!(store.get("anything").unwrap(), None);
    assert!(!path.exists());

    store.set("key", "value").unwrap();
    assert!(path.is_file());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn corrupt_file_starts_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.ron");
    fs::write(&path, "this is not ron {").unwrap();

    let store = RonFileStore::open(&path);
    assert_eq!(store.get("wrappedJobId").unwrap(), None);

    store.set("wrappedJobId", "\"job-2\"").unwrap();
    let reopened = RonFileStore::open(&path);
    assert_eq!(
        reopened.get("wrappedJobId").unwrap().as_deref(),
        Some("\"job-2\"")
    );
}

#[test]
fn remove_rewrites_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.ron");

    let store = RonFileStore::open(&path);
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();
    store.remove("a").unwrap();
    store.remove("never-set").unwrap();

    let reopened = RonFileStore::open(&path);
    assert_eq!(reopened.get("a").unwrap(), None);
    assert_eq!(reopened.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn session_selection_round_trips_through_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.ron");

    let session = SessionStore::new(Arc::new(RonFileStore::open(&path)));
    let mut selection = Selection::from_names(["Ana", "Ben", "Cy"]);
    selection.toggle("Ben");
    session.set_selection(&selection).unwrap();
    session.set_job_id("job-9").unwrap();

    let session = SessionStore::new(Arc::new(RonFileStore::open(&path)));
    assert_eq!(session.job_id().as_deref(), Some("job-9"));
    let restored = session.selection().expect("selection stored");
    assert_eq!(restored.selected(), vec!["Ana".to_string(), "Cy".to_string()]);
    assert_eq!(restored.len(), 3);
}

#[test]
fn legacy_name_list_restores_everyone_selected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state.ron");
    let store = Arc::new(RonFileStore::open(&path));
    store
        .set("wrappedParticipants", r#"["Ana","Ben"]"#)
        .unwrap();

    let session = SessionStore::new(store);
    let restored = session.selection().expect("selection stored");
    assert!(restored.all_selected());
    assert_eq!(restored.len(), 2);
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let store = RonFileStore::open(blocker.join("state.ron"));
    assert!(store.set("wrappedJobId", "\"job-1\"").is_err());
    assert_eq!(store.get("wrappedJobId").unwrap(), None);
}

#[test]
fn failed_remove_keeps_the_value() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("session");
    let store = RonFileStore::open(dir.join("state.ron"));
    store.set("a", "1").unwrap();

    fs::remove_dir_all(&dir).unwrap();
    fs::write(&dir, "not a directory").unwrap();

    assert!(store.remove("a").is_err());
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
}
