//! Sync group persistence.
//!
//! The whole name → group mapping is one JSON document: loaded fully and
//! rewritten fully on every mutation. There is no file locking, so concurrent
//! external writers may lose updates.

use crate::models::SyncGroup;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use thiserror::Error;

/// Groups keyed by name, in the order they were first saved
pub type SyncGroups = IndexMap<String, SyncGroup>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sync group name must not be empty")]
    EmptyName,

    #[error("Sync group '{name}' is missing its {field} path")]
    MissingPath { name: String, field: &'static str },

    #[error("Sync group '{0}' not found")]
    NotFound(String),

    #[error("Failed to write sync groups to {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize sync groups: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed store of [`SyncGroup`]s.
#[derive(Debug, Clone)]
pub struct SyncGroupStore {
    path: Utf8PathBuf,
}

impl SyncGroupStore {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load every group.
    ///
    /// A missing or unparsable file yields an empty mapping; this never fails.
    pub fn load(&self) -> SyncGroups {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No sync groups loaded from {}: {}", self.path, e);
                return SyncGroups::new();
            }
        };

        match serde_json::from_str::<SyncGroups>(&content) {
            Ok(mut groups) => {
                for (name, group) in groups.iter_mut() {
                    group.name = name.clone();
                }
                tracing::debug!("Loaded {} sync groups from {}", groups.len(), self.path);
                groups
            }
            Err(e) => {
                tracing::warn!("Ignoring unparsable sync group file {}: {}", self.path, e);
                SyncGroups::new()
            }
        }
    }

    /// Replace the stored mapping with `groups`.
    pub fn save(&self, groups: &SyncGroups) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        groups.serialize(&mut serializer)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let temp_path = Utf8PathBuf::from(format!("{}.tmp", self.path));
        fs::write(&temp_path, &buf).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!("Saved {} sync groups to {}", groups.len(), self.path);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<SyncGroup> {
        self.load().shift_remove(name)
    }

    /// Save `group` under its name, replacing any group with the same name.
    pub fn upsert(&self, group: SyncGroup) -> Result<(), StoreError> {
        let name = group.name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if group.source.as_str().trim().is_empty() {
            return Err(StoreError::MissingPath {
                name: name.to_string(),
                field: "source",
            });
        }
        if group.target.as_str().trim().is_empty() {
            return Err(StoreError::MissingPath {
                name: name.to_string(),
                field: "target",
            });
        }

        let name = name.to_string();
        let mut groups = self.load();
        groups.insert(name.clone(), SyncGroup { name, ..group });
        self.save(&groups)
    }

    /// Remove the group called `name`.
    ///
    /// Returns whether a group was removed; an absent name leaves the file untouched.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut groups = self.load();
        if groups.shift_remove(name).is_none() {
            return Ok(false);
        }
        self.save(&groups)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SyncMode;
    use tempfile::TempDir;

    fn create_test_store() -> (SyncGroupStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (SyncGroupStore::new(dir.join("sync_groups.json")), temp_dir)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_uses_four_space_indent_and_raw_unicode() {
        let (store, _temp_dir) = create_test_store();
        store
            .upsert(SyncGroup::new("照片", "/源", "/目标", SyncMode::Incremental))
            .unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\n    \"照片\": {"));
        assert!(content.contains("\"/源\""));
        assert!(!content.contains("\\u"));
    }

    #[test]
    fn test_upsert_trims_name() {
        let (store, _temp_dir) = create_test_store();
        store
            .upsert(SyncGroup::new("  docs ", "/a", "/b", SyncMode::OneWay))
            .unwrap();
        let group = store.get("docs").unwrap();
        assert_eq!(group.name, "docs");
    }

    #[test]
    fn test_upsert_rejects_blank_name() {
        let (store, _temp_dir) = create_test_store();
        let err = store
            .upsert(SyncGroup::new("   ", "/a", "/b", SyncMode::OneWay))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_upsert_rejects_missing_target() {
        let (store, _temp_dir) = create_test_store();
        let err = store
            .upsert(SyncGroup::new("g", "/a", "", SyncMode::OneWay))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingPath { field: "target", .. }));
    }
}
