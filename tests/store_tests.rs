//! Integration tests for the sync group store

use camino::Utf8PathBuf;
use fileproc::store::{StoreError, SyncGroups};
use fileproc::{SyncGroup, SyncGroupStore, SyncMode};
use std::fs;
use tempfile::TempDir;

fn create_store() -> (TempDir, SyncGroupStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("sync_groups.json")).unwrap();
    (temp_dir, SyncGroupStore::new(path))
}

fn g1() -> SyncGroups {
    let mut groups = SyncGroups::new();
    groups.insert("G1".to_string(), SyncGroup::new("G1", "/s", "/t", SyncMode::OneWay));
    groups
}

#[test]
fn test_save_then_load_returns_equal_mapping() {
    let (_temp_dir, store) = create_store();

    store.save(&g1()).unwrap();

    assert_eq!(store.load(), g1());
}

#[test]
fn test_delete_then_load_is_empty() {
    let (_temp_dir, store) = create_store();
    store.save(&g1()).unwrap();

    assert!(store.delete("G1").unwrap());

    assert!(store.load().is_empty());
}

#[test]
fn test_delete_absent_is_noop() {
    let (_temp_dir, store) = create_store();
    store.save(&g1()).unwrap();

    assert!(!store.delete("other").unwrap());
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_missing_or_corrupt_file_loads_empty() {
    let (_temp_dir, store) = create_store();
    assert!(store.load().is_empty());

    fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_file_format() {
    let (_temp_dir, store) = create_store();
    let mut groups = SyncGroups::new();
    groups.insert("照片".to_string(), SyncGroup::new("照片", "/home/照片", "/backup", SyncMode::Mirror));
    store.save(&groups).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("\"照片\""));
    assert!(text.contains("\n    \"照片\": {\n        \"source\""));
    assert!(text.contains("\"mode\": \"Mirror\""));
    // The name is the key, not a field
    assert!(!text.contains("\"name\""));
}

#[test]
fn test_legacy_mode_labels_load() {
    let (_temp_dir, store) = create_store();
    let legacy = r#"{
    "docs": {"source": "/a", "target": "/b", "mode": "单向同步"},
    "media": {"source": "/c", "target": "/d", "mode": "镜像同步"}
}"#;
    fs::write(store.path(), legacy).unwrap();

    let groups = store.load();
    assert_eq!(groups["docs"].mode, SyncMode::OneWay);
    assert_eq!(groups["media"].mode, SyncMode::Mirror);
    assert_eq!(groups["media"].name, "media");
}

#[test]
fn test_upsert_last_write_wins_and_keeps_order() {
    let (_temp_dir, store) = create_store();
    store.upsert(SyncGroup::new("b", "/1", "/2", SyncMode::Incremental)).unwrap();
    store.upsert(SyncGroup::new("a", "/3", "/4", SyncMode::Incremental)).unwrap();
    store.upsert(SyncGroup::new("b", "/5", "/6", SyncMode::Mirror)).unwrap();

    let groups = store.load();
    let names: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(store.get("b").unwrap().source, "/5");
    assert_eq!(store.get("b").unwrap().mode, SyncMode::Mirror);
}

#[test]
fn test_upsert_validation() {
    let (_temp_dir, store) = create_store();

    let err = store.upsert(SyncGroup::new("  ", "/s", "/t", SyncMode::OneWay)).unwrap_err();
    assert!(matches!(err, StoreError::EmptyName));

    let err = store.upsert(SyncGroup::new("g", "", "/t", SyncMode::OneWay)).unwrap_err();
    assert!(matches!(err, StoreError::MissingPath { field: "source", .. }));

    assert!(!store.path().exists());
}
