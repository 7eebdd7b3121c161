use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Application settings from `fileproc.yaml`, overridable by `FILEPROC_*`
/// environment variables.
///
/// Relative paths resolve against the process working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sync group store file
    pub groups_file: Utf8PathBuf,

    /// Append-only sync log shared by every reconciliation
    pub sync_log_file: Utf8PathBuf,

    /// Directory for rolling diagnostic logs
    pub log_dir: Utf8PathBuf,

    pub log_prefix: String,

    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            groups_file: Utf8PathBuf::from("sync_groups.json"),
            sync_log_file: Utf8PathBuf::from("sync_log.txt"),
            log_dir: Utf8PathBuf::from("logs"),
            log_prefix: "fileproc".to_string(),
            debug: false,
        }
    }
}
