//! Explicit per-process context handed to every core call.
//!
//! Holds what used to be ambient state: the sync group store, the shared sync
//! log file, and the set of source/target pairs currently being reconciled.

use crate::models::{LogLine, Settings};
use crate::store::SyncGroupStore;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Append-only, timestamped sync log shared by all reconciliations.
#[derive(Debug, Clone)]
pub struct SyncLogFile {
    path: Utf8PathBuf,
}

impl SyncLogFile {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Append `lines`, each prefixed with the current local time.
    pub fn append(&self, lines: &[LogLine]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut buf = String::new();
        for line in lines {
            buf.push_str(&format!("{} - [{}] {}\n", timestamp, line.level.tag(), line.message));
        }
        file.write_all(buf.as_bytes())?;
        file.flush()
    }
}

/// Source/target pairs with a reconciliation in flight.
#[derive(Debug, Default)]
pub struct ActiveSyncs {
    pairs: Mutex<HashSet<(Utf8PathBuf, Utf8PathBuf)>>,
}

impl ActiveSyncs {
    /// Claim the pair, or `None` if a reconciliation of it is already running.
    ///
    /// Direction does not matter: `(a, b)` and `(b, a)` touch the same two
    /// trees and are the same claim. The claim is released when the returned
    /// guard drops.
    pub fn try_claim(&self, source: &Utf8Path, target: &Utf8Path) -> Option<ActiveSyncGuard<'_>> {
        let key = pair_key(source, target);
        let mut pairs = match self.pairs.lock() {
            Ok(pairs) => pairs,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !pairs.insert(key.clone()) {
            return None;
        }
        Some(ActiveSyncGuard { owner: self, key })
    }

    pub fn is_active(&self, source: &Utf8Path, target: &Utf8Path) -> bool {
        let pairs = match self.pairs.lock() {
            Ok(pairs) => pairs,
            Err(poisoned) => poisoned.into_inner(),
        };
        pairs.contains(&pair_key(source, target))
    }
}

/// Canonical path when it resolves, otherwise the path with redundant
/// separators and `.` components dropped.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    path.canonicalize_utf8().unwrap_or_else(|_| path.components().collect())
}

fn pair_key(a: &Utf8Path, b: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let (a, b) = (normalize(a), normalize(b));
    if a <= b { (a, b) } else { (b, a) }
}

pub struct ActiveSyncGuard<'a> {
    owner: &'a ActiveSyncs,
    key: (Utf8PathBuf, Utf8PathBuf),
}

impl Drop for ActiveSyncGuard<'_> {
    fn drop(&mut self) {
        let mut pairs = match self.owner.pairs.lock() {
            Ok(pairs) => pairs,
            Err(poisoned) => poisoned.into_inner(),
        };
        pairs.remove(&self.key);
    }
}

/// Everything a core operation needs beyond its own arguments.
///
/// Cheap to share: wrap in an `Arc` to hand it to the background worker.
#[derive(Debug)]
pub struct AppContext {
    pub store: SyncGroupStore,
    pub sync_log: SyncLogFile,
    pub active: ActiveSyncs,
}

impl AppContext {
    pub fn new(store: SyncGroupStore, sync_log: SyncLogFile) -> Self {
        Self {
            store,
            sync_log,
            active: ActiveSyncs::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            SyncGroupStore::new(&settings.groups_file),
            SyncLogFile::new(&settings.sync_log_file),
        )
    }

    /// Context whose store and sync log live under `dir` (used by tests and
    /// isolated front ends).
    pub fn in_dir<P: AsRef<Utf8Path>>(dir: P) -> Self {
        let settings = Settings::default();
        let dir = dir.as_ref();
        Self::new(
            SyncGroupStore::new(dir.join(&settings.groups_file)),
            SyncLogFile::new(dir.join(&settings.sync_log_file)),
        )
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
