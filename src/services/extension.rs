use crate::models::{LogLine, LogSink, OperationLog};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

static EXTENSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("Invalid extension regex")
});

#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Source and target extensions must not be empty")]
    Empty,

    #[error("Invalid extension '{0}'")]
    Invalid(String),

    #[error("Directory does not exist or is not a directory: {0}")]
    RootNotFound(Utf8PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionReport {
    pub renamed: usize,
    pub failed: usize,
    pub log: Vec<LogLine>,
}

/// Strip one leading dot and validate.
fn normalize(ext: &str) -> Result<String, ExtensionError> {
    let ext = ext.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() {
        return Err(ExtensionError::Empty);
    }
    if !EXTENSION_PATTERN.is_match(ext) {
        return Err(ExtensionError::Invalid(ext.to_string()));
    }
    Ok(ext.to_string())
}

/// Rename every file under `root` ending in `.from` so it ends in `.to`.
///
/// Only the trailing extension changes; `a.txt.bak` with `from = "txt"` is
/// left alone. Existing files are never overwritten.
pub fn change_extensions(
    root: &Utf8Path,
    from: &str,
    to: &str,
    sink: &mut dyn LogSink,
) -> Result<ExtensionReport, ExtensionError> {
    let from = normalize(from)?;
    let to = normalize(to)?;
    if !root.is_dir() {
        return Err(ExtensionError::RootNotFound(root.to_path_buf()));
    }

    let suffix = format!(".{}", from);
    let mut log = OperationLog::new(sink);
    let mut report = ExtensionReport::default();

    // Collect first so renamed files are not visited again
    let mut matches = Vec::new();
    for item in WalkDir::new(root).sort_by_file_name() {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                log.error(format!("Cannot read {}: {}", root, e));
                report.failed += 1;
                continue;
            }
        };
        if !item.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(item.path()) else {
            continue;
        };
        let Some(name) = path.file_name() else {
            continue;
        };
        if name.len() > suffix.len() && name.ends_with(&suffix) {
            matches.push(path.to_path_buf());
        }
    }

    for old_path in matches {
        let Some(name) = old_path.file_name() else {
            continue;
        };
        let stem = &name[..name.len() - suffix.len()];
        let new_path = old_path.with_file_name(format!("{}.{}", stem, to));

        if new_path.exists() {
            log.error(format!(
                "Extension change failed: {} -> {}: target already exists",
                old_path, new_path
            ));
            report.failed += 1;
            continue;
        }

        match fs::rename(&old_path, &new_path) {
            Ok(()) => {
                log.success(format!("Changed extension: {} -> {}", old_path, new_path));
                report.renamed += 1;
            }
            Err(e) => {
                log.error(format!("Extension change failed: {} -> {}: {}", old_path, new_path, e));
                report.failed += 1;
            }
        }
    }

    if report.renamed == 0 && report.failed == 0 {
        log.info(format!("No files matching .{} found", from));
    } else {
        log.info(format!(
            "Changed the extension of {} files ({} failed)",
            report.renamed, report.failed
        ));
    }

    report.log = log.into_lines();
    Ok(report)
}
