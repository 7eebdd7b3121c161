use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Synchronization semantics for a source/target pair.
///
/// The aliases accept the Chinese labels written by earlier releases, so an
/// existing `sync_groups.json` keeps loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    /// Copy new or changed entries, never delete.
    #[serde(alias = "增量同步")]
    Incremental,

    /// Copy new or changed entries, then purge target entries absent from the source.
    #[serde(alias = "单向同步")]
    OneWay,

    /// One-way source → target, then one-way target → source.
    #[serde(alias = "镜像同步")]
    Mirror,
}

impl SyncMode {
    pub const ALL: [SyncMode; 3] = [SyncMode::Incremental, SyncMode::OneWay, SyncMode::Mirror];

    /// Whether a pass in this mode removes extraneous target entries
    pub fn purges(self) -> bool {
        !matches!(self, SyncMode::Incremental)
    }

    pub fn label(self) -> &'static str {
        match self {
            SyncMode::Incremental => "Incremental",
            SyncMode::OneWay => "OneWay",
            SyncMode::Mirror => "Mirror",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "incremental" | "增量同步" => Ok(SyncMode::Incremental),
            "oneway" | "单向同步" => Ok(SyncMode::OneWay),
            "mirror" | "镜像同步" => Ok(SyncMode::Mirror),
            other => Err(format!(
                "unknown sync mode '{}' (expected incremental, one-way or mirror)",
                other
            )),
        }
    }
}

/// A named, persisted (source, target, mode) triple.
///
/// The name is the map key in the backing file, so it is not serialized with
/// the record; [`crate::store::SyncGroupStore::load`] fills it back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGroup {
    #[serde(skip)]
    pub name: String,
    pub source: Utf8PathBuf,
    pub target: Utf8PathBuf,
    pub mode: SyncMode,
}

impl SyncGroup {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<Utf8PathBuf>,
        target: impl Into<Utf8PathBuf>,
        mode: SyncMode,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            mode,
        }
    }
}
