//! Bulk renaming from a two-column mapping (original name → target name).

use crate::models::{LogLine, LogSink, OperationLog};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Rename root does not exist or is not a directory: {0}")]
    RootNotFound(Utf8PathBuf),

    #[error("Failed to read mapping file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Mapping needs at least two columns, found {found} on row {row}")]
    TooFewColumns { row: usize, found: usize },
}

/// One row of the mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub original_name: String,
    pub target_name: String,
}

impl RenameEntry {
    pub fn new(original_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            target_name: target_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenameReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub log: Vec<LogLine>,
}

/// Read a CSV mapping (TSV when the extension is `.tsv`).
///
/// Row 1 is a header and is skipped; columns are taken by position. Extra
/// columns are ignored. Any row with fewer than two columns rejects the whole
/// file.
pub fn read_mapping(path: &Utf8Path) -> Result<Vec<RenameEntry>, RenameError> {
    let delimiter = match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    let read_err = |source| RenameError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?;
    if headers.len() < 2 {
        return Err(RenameError::TooFewColumns {
            row: 1,
            found: headers.len(),
        });
    }

    let mut entries = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(read_err)?;
        match (record.get(0), record.get(1)) {
            (Some(original), Some(target)) => {
                entries.push(RenameEntry::new(original.trim(), target.trim()));
            }
            _ => {
                return Err(RenameError::TooFewColumns {
                    row: idx + 2,
                    found: record.len(),
                });
            }
        }
    }

    tracing::debug!("Read {} rename entries from {}", entries.len(), path);
    Ok(entries)
}

/// A name that stays inside the root: relative, no `..`, no prefix.
fn is_contained(name: &str) -> bool {
    !name.is_empty()
        && Utf8Path::new(name)
            .components()
            .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir))
}

/// Apply `entries` in order under `root`.
///
/// Every entry is independent: a missing original, an occupied target, or a
/// failed rename is logged and counted without stopping later entries.
pub fn apply_renames(
    root: &Utf8Path,
    entries: &[RenameEntry],
    sink: &mut dyn LogSink,
) -> Result<RenameReport, RenameError> {
    if !root.is_dir() {
        return Err(RenameError::RootNotFound(root.to_path_buf()));
    }

    let mut log = OperationLog::new(sink);
    let mut report = RenameReport::default();

    for entry in entries {
        if !is_contained(&entry.original_name) || !is_contained(&entry.target_name) {
            log.error(format!(
                "Rename rejected, names must stay inside {}: {} -> {}",
                root, entry.original_name, entry.target_name
            ));
            report.failure_count += 1;
            continue;
        }

        let old_path = root.join(&entry.original_name);
        let new_path = root.join(&entry.target_name);

        if !old_path.exists() {
            log.error(format!("File not found: {}", old_path));
            report.failure_count += 1;
            continue;
        }
        if old_path != new_path && new_path.exists() {
            log.error(format!(
                "Rename failed: {} -> {}: target already exists",
                old_path, new_path
            ));
            report.failure_count += 1;
            continue;
        }

        match fs::rename(&old_path, &new_path) {
            Ok(()) => {
                log.success(format!("Renamed: {} -> {}", old_path, new_path));
                report.success_count += 1;
            }
            Err(e) => {
                log.error(format!("Rename failed: {} -> {}: {}", old_path, new_path, e));
                report.failure_count += 1;
            }
        }
    }

    log.info(format!(
        "Rename finished: {} succeeded, {} failed",
        report.success_count, report.failure_count
    ));
    report.log = log.into_lines();
    Ok(report)
}

/// Read `mapping_path` and apply it under `root`.
pub fn rename_from_mapping(
    root: &Utf8Path,
    mapping_path: &Utf8Path,
    sink: &mut dyn LogSink,
) -> Result<RenameReport, RenameError> {
    if !root.is_dir() {
        return Err(RenameError::RootNotFound(root.to_path_buf()));
    }
    let entries = read_mapping(mapping_path)?;
    apply_renames(root, &entries, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NullSink;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained("a.txt"));
        assert!(is_contained("sub/a.txt"));
        assert!(!is_contained(""));
        assert!(!is_contained("../a.txt"));
        assert!(!is_contained("/etc/passwd"));
    }

    #[test]
    fn test_read_mapping_skips_header() {
        let (_tmp, root) = temp_root();
        let path = root.join("map.csv");
        fs::write(&path, "old,new\na.txt,b.txt\nc.txt,d.txt\n").unwrap();

        let entries = read_mapping(&path).unwrap();
        assert_eq!(
            entries,
            vec![RenameEntry::new("a.txt", "b.txt"), RenameEntry::new("c.txt", "d.txt")]
        );
    }

    #[test]
    fn test_read_mapping_tsv() {
        let (_tmp, root) = temp_root();
        let path = root.join("map.tsv");
        fs::write(&path, "old\tnew\textra\na, b.txt\tc.txt\tignored\n").unwrap();

        let entries = read_mapping(&path).unwrap();
        assert_eq!(entries, vec![RenameEntry::new("a, b.txt", "c.txt")]);
    }

    #[test]
    fn test_read_mapping_rejects_single_column() {
        let (_tmp, root) = temp_root();
        let path = root.join("map.csv");
        fs::write(&path, "names\na.txt\n").unwrap();

        let err = read_mapping(&path).unwrap_err();
        assert!(matches!(err, RenameError::TooFewColumns { row: 1, found: 1 }));
    }

    #[test]
    fn test_read_mapping_rejects_short_row() {
        let (_tmp, root) = temp_root();
        let path = root.join("map.csv");
        fs::write(&path, "old,new\na.txt,b.txt\nlonely\n").unwrap();

        let err = read_mapping(&path).unwrap_err();
        assert!(matches!(err, RenameError::TooFewColumns { row: 3, found: 1 }));
    }

    #[test]
    fn test_occupied_target_is_not_overwritten() {
        let (_tmp, root) = temp_root();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();

        let report = apply_renames(&root, &[RenameEntry::new("a.txt", "b.txt")], &mut NullSink).unwrap();
        assert_eq!(report.failure_count, 1);
        assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "b");
        assert!(root.join("a.txt").exists());
    }

    #[test]
    fn test_escaping_names_rejected() {
        let (_tmp, root) = temp_root();
        fs::write(root.join("a.txt"), "a").unwrap();

        let report = apply_renames(&root, &[RenameEntry::new("a.txt", "../a.txt")], &mut NullSink).unwrap();
        assert_eq!(report.failure_count, 1);
        assert!(root.join("a.txt").exists());
    }
}
