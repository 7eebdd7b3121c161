use crate::context::AppContext;
use crate::models::{LogLine, LogSink, OperationLog, SyncMode};
use camino::{Utf8Path, Utf8PathBuf};
use filetime::FileTime;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that reject a reconciliation before it starts
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("{0} path must not be empty")]
    EmptyPath(&'static str),

    #[error("Source and target overlap: {from} and {to}")]
    Overlapping { from: Utf8PathBuf, to: Utf8PathBuf },

    #[error("A sync from {from} to {to} is already running")]
    AlreadyRunning { from: Utf8PathBuf, to: Utf8PathBuf },

    #[error("Sync group '{0}' not found")]
    UnknownGroup(String),
}

/// Failures that abort a pass after it has started
#[derive(Error, Debug)]
enum TraversalError {
    #[error("source directory does not exist: {0}")]
    SourceMissing(Utf8PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    #[error("failed to create target directory {path}: {source}")]
    CreateRoot {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {root}: {source}")]
    Walk {
        root: Utf8PathBuf,
        source: walkdir::Error,
    },
}

/// Counters for one reconciliation (summed over both Mirror passes)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub dirs_created: usize,
    pub files_copied: usize,
    pub files_updated: usize,
    pub entries_deleted: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failures: usize,
}

impl ReconcileStats {
    pub fn summary(&self) -> String {
        format!(
            "{} directories created, {} files copied, {} files updated, {} entries deleted, {} unchanged, {} skipped, {} failed",
            self.dirs_created,
            self.files_copied,
            self.files_updated,
            self.entries_deleted,
            self.unchanged,
            self.skipped,
            self.failures
        )
    }

    /// Whether the run changed anything on disk
    pub fn has_changes(&self) -> bool {
        self.dirs_created > 0 || self.files_copied > 0 || self.files_updated > 0 || self.entries_deleted > 0
    }
}

/// Result of a reconciliation, including runs that aborted part-way
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub mode: SyncMode,
    pub stats: ReconcileStats,
    pub log: Vec<LogLine>,
    /// Set when traversal failed and the run stopped early
    pub aborted: Option<String>,
}

impl ReconcileReport {
    pub fn is_success(&self) -> bool {
        self.aborted.is_none() && self.stats.failures == 0
    }
}

#[derive(Debug, Clone, Copy)]
enum EntryKind {
    Dir,
    File { size: u64, mtime: FileTime },
    Symlink,
    Special,
}

#[derive(Debug, Clone)]
struct Entry {
    rel: Utf8PathBuf,
    kind: EntryKind,
}

/// Reconcile `target` with `source` according to `mode`.
///
/// The log is streamed to `sink`, returned in the report, and appended to the
/// context's sync log file. Per-entry failures are logged and counted; a
/// traversal failure aborts the remaining work but still produces the closing
/// timestamp line.
pub fn reconcile(
    ctx: &AppContext,
    source: &Utf8Path,
    target: &Utf8Path,
    mode: SyncMode,
    sink: &mut dyn LogSink,
) -> Result<ReconcileReport, ReconcileError> {
    if source.as_str().trim().is_empty() {
        return Err(ReconcileError::EmptyPath("Source"));
    }
    if target.as_str().trim().is_empty() {
        return Err(ReconcileError::EmptyPath("Target"));
    }
    if overlapping(source, target) {
        return Err(ReconcileError::Overlapping {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
        });
    }

    let _guard = ctx
        .active
        .try_claim(source, target)
        .ok_or_else(|| ReconcileError::AlreadyRunning {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
        })?;

    let mut log = OperationLog::new(sink);
    let mut stats = ReconcileStats::default();

    log.info(format!("Sync started: {}", timestamp()));

    let outcome = match mode {
        SyncMode::Incremental | SyncMode::OneWay => {
            log.info(format!("{} sync: {} -> {}", mode, source, target));
            run_pass(source, target, mode.purges(), &mut log, &mut stats)
        }
        SyncMode::Mirror => {
            log.info(format!("Mirror pass 1/2: {} -> {}", source, target));
            run_pass(source, target, true, &mut log, &mut stats).and_then(|()| {
                log.info(format!("Mirror pass 2/2: {} -> {}", target, source));
                run_pass(target, source, true, &mut log, &mut stats)
            })
        }
    };

    let aborted = match outcome {
        Ok(()) => None,
        Err(e) => {
            log.error(format!("Sync aborted: {}", e));
            Some(e.to_string())
        }
    };

    log.info(format!("Sync summary: {}", stats.summary()));
    log.info(format!("Sync finished: {}", timestamp()));

    let lines = log.into_lines();
    if let Err(e) = ctx.sync_log.append(&lines) {
        tracing::warn!("Failed to append to sync log {}: {}", ctx.sync_log.path(), e);
    }

    Ok(ReconcileReport {
        mode,
        stats,
        log: lines,
        aborted,
    })
}

/// Reconcile the stored group called `name`.
pub fn reconcile_group(
    ctx: &AppContext,
    name: &str,
    sink: &mut dyn LogSink,
) -> Result<ReconcileReport, ReconcileError> {
    let group = ctx
        .store
        .get(name)
        .ok_or_else(|| ReconcileError::UnknownGroup(name.to_string()))?;
    tracing::info!("Running sync group '{}' ({})", group.name, group.mode);
    reconcile(ctx, &group.source, &group.target, group.mode, sink)
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn overlapping(source: &Utf8Path, target: &Utf8Path) -> bool {
    if source.starts_with(target) || target.starts_with(source) {
        return true;
    }
    match (source.canonicalize_utf8(), target.canonicalize_utf8()) {
        (Ok(s), Ok(t)) => s.starts_with(&t) || t.starts_with(&s),
        _ => false,
    }
}

/// One directional pass: copy new/changed entries, then optionally purge.
fn run_pass(
    source: &Utf8Path,
    target: &Utf8Path,
    purge: bool,
    log: &mut OperationLog<'_>,
    stats: &mut ReconcileStats,
) -> Result<(), TraversalError> {
    if !source.exists() {
        return Err(TraversalError::SourceMissing(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(TraversalError::NotADirectory(source.to_path_buf()));
    }

    if !target.exists() {
        fs::create_dir_all(target).map_err(|e| TraversalError::CreateRoot {
            path: target.to_path_buf(),
            source: e,
        })?;
        log.success(format!("Created directory: {}", target));
        stats.dirs_created += 1;
    } else if !target.is_dir() {
        return Err(TraversalError::NotADirectory(target.to_path_buf()));
    }

    let source_entries = scan(source, log, stats)?;

    for entry in &source_entries {
        copy_entry(source, target, entry, purge, log, stats);
    }

    if purge {
        let keep: HashSet<&Utf8Path> = source_entries.iter().map(|e| e.rel.as_path()).collect();
        let target_entries = scan(target, log, stats)?;
        // Directories holding a link or special file that must stay
        let mut pinned: HashSet<Utf8PathBuf> = HashSet::new();
        // Pre-order reversed puts every child before its parent
        for entry in target_entries.iter().rev() {
            if keep.contains(entry.rel.as_path()) {
                continue;
            }
            match entry.kind {
                EntryKind::Symlink | EntryKind::Special => {
                    log.warn(format!("Kept link or special file absent from source: {}", target.join(&entry.rel)));
                    stats.skipped += 1;
                    pin_ancestors(&entry.rel, &mut pinned);
                }
                EntryKind::Dir if pinned.contains(&entry.rel) => {
                    log.warn(format!("Kept directory holding skipped entries: {}", target.join(&entry.rel)));
                    pin_ancestors(&entry.rel, &mut pinned);
                }
                _ => delete_entry(target, entry, log, stats),
            }
        }
    }

    Ok(())
}

fn pin_ancestors(rel: &Utf8Path, pinned: &mut HashSet<Utf8PathBuf>) {
    let mut current = rel.parent();
    while let Some(dir) = current {
        if dir.as_str().is_empty() || !pinned.insert(dir.to_path_buf()) {
            break;
        }
        current = dir.parent();
    }
}

/// Walk `root` (without following links) in sorted pre-order.
fn scan(
    root: &Utf8Path,
    log: &mut OperationLog<'_>,
    stats: &mut ReconcileStats,
) -> Result<Vec<Entry>, TraversalError> {
    let mut entries = Vec::new();

    for item in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let item = item.map_err(|e| TraversalError::Walk {
            root: root.to_path_buf(),
            source: e,
        })?;
        if item.depth() == 0 {
            continue;
        }

        let Some(path) = Utf8Path::from_path(item.path()) else {
            log.warn(format!("Skipped entry with non UTF-8 name: {}", item.path().display()));
            stats.skipped += 1;
            continue;
        };
        let Ok(rel) = path.strip_prefix(root) else {
            continue;
        };

        let file_type = item.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            let metadata = item.metadata().map_err(|e| TraversalError::Walk {
                root: root.to_path_buf(),
                source: e,
            })?;
            EntryKind::File {
                size: metadata.len(),
                mtime: FileTime::from_last_modification_time(&metadata),
            }
        } else {
            EntryKind::Special
        };

        entries.push(Entry {
            rel: rel.to_path_buf(),
            kind,
        });
    }

    Ok(entries)
}

/// Bring `target/entry.rel` in line with the source entry.
///
/// In a purging pass an entry of the other kind in the way is removed first;
/// otherwise it is reported as a failure and left alone.
fn copy_entry(
    source: &Utf8Path,
    target: &Utf8Path,
    entry: &Entry,
    purge: bool,
    log: &mut OperationLog<'_>,
    stats: &mut ReconcileStats,
) {
    let src = source.join(&entry.rel);
    let dst = target.join(&entry.rel);

    match entry.kind {
        EntryKind::Dir => {
            let create = match fs::symlink_metadata(&dst) {
                Ok(meta) if meta.is_dir() => false,
                Ok(_) if purge => clear_conflict(&dst, log, stats),
                Ok(_) => {
                    log.error(format!("Cannot create directory {}: a file is in the way", dst));
                    stats.failures += 1;
                    false
                }
                Err(e) if e.kind() == ErrorKind::NotFound => true,
                Err(e) => {
                    log.error(format!("Failed to inspect {}: {}", dst, e));
                    stats.failures += 1;
                    false
                }
            };
            if create {
                match fs::create_dir_all(&dst) {
                    Ok(()) => {
                        log.success(format!("Created directory: {}", dst));
                        stats.dirs_created += 1;
                    }
                    Err(e) => {
                        log.error(format!("Failed to create directory {}: {}", dst, e));
                        stats.failures += 1;
                    }
                }
            }
        }
        EntryKind::File { size, mtime } => {
            let updating = match fs::symlink_metadata(&dst) {
                Err(e) if e.kind() == ErrorKind::NotFound => false,
                Ok(meta) if meta.is_file() => {
                    if !differs(size, mtime, &meta) {
                        stats.unchanged += 1;
                        return;
                    }
                    true
                }
                Ok(_) if purge => {
                    if !clear_conflict(&dst, log, stats) {
                        return;
                    }
                    false
                }
                Ok(_) => {
                    log.error(format!("Cannot copy {} over non-file {}", src, dst));
                    stats.failures += 1;
                    return;
                }
                Err(e) => {
                    log.error(format!("Failed to inspect {}: {}", dst, e));
                    stats.failures += 1;
                    return;
                }
            };

            match copy_file(&src, &dst, mtime) {
                Ok(()) if updating => {
                    log.success(format!("Updated file: {} -> {}", src, dst));
                    stats.files_updated += 1;
                }
                Ok(()) => {
                    log.success(format!("Copied file: {} -> {}", src, dst));
                    stats.files_copied += 1;
                }
                Err(e) => {
                    log.error(format!("Failed to copy {} -> {}: {}", src, dst, e));
                    stats.failures += 1;
                }
            }
        }
        EntryKind::Symlink => {
            log.warn(format!("Skipped symbolic link: {}", src));
            stats.skipped += 1;
        }
        EntryKind::Special => {
            log.warn(format!("Skipped special file: {}", src));
            stats.skipped += 1;
        }
    }
}

/// Size or mtime (at whole-second resolution) differ from the target file.
fn differs(size: u64, mtime: FileTime, target: &fs::Metadata) -> bool {
    let target_mtime = FileTime::from_last_modification_time(target);
    size != target.len() || mtime.unix_seconds() != target_mtime.unix_seconds()
}

fn copy_file(src: &Utf8Path, dst: &Utf8Path, mtime: FileTime) -> std::io::Result<()> {
    fs::copy(src, dst)?;
    filetime::set_file_mtime(dst, mtime)
}

/// Remove `dst` and everything below it, contents first.
///
/// Refuses, without deleting anything, when a link or special file is part
/// of it. Returns whether `dst` is gone.
fn clear_conflict(dst: &Utf8Path, log: &mut OperationLog<'_>, stats: &mut ReconcileStats) -> bool {
    let mut doomed = Vec::new();
    for item in WalkDir::new(dst).follow_links(false).contents_first(true) {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                log.error(format!("Failed to read {}: {}", dst, e));
                stats.failures += 1;
                return false;
            }
        };
        let file_type = item.file_type();
        if !file_type.is_dir() && !file_type.is_file() {
            log.error(format!(
                "Cannot replace {}: {} is a link or special file",
                dst,
                item.path().display()
            ));
            stats.failures += 1;
            return false;
        }
        doomed.push((item.into_path(), file_type.is_dir()));
    }

    for (path, is_dir) in doomed {
        let (what, result) = if is_dir {
            ("directory", fs::remove_dir(&path))
        } else {
            ("file", fs::remove_file(&path))
        };
        match result {
            Ok(()) => {
                log.success(format!("Deleted {}: {}", what, path.display()));
                stats.entries_deleted += 1;
            }
            Err(e) => {
                log.error(format!("Failed to delete {} {}: {}", what, path.display(), e));
                stats.failures += 1;
                return false;
            }
        }
    }
    true
}

fn delete_entry(target: &Utf8Path, entry: &Entry, log: &mut OperationLog<'_>, stats: &mut ReconcileStats) {
    let path = target.join(&entry.rel);
    let (what, result) = match entry.kind {
        EntryKind::Dir => ("directory", fs::remove_dir(&path)),
        _ => ("file", fs::remove_file(&path)),
    };

    match result {
        Ok(()) => {
            log.success(format!("Deleted {}: {}", what, path));
            stats.entries_deleted += 1;
        }
        Err(e) => {
            log.error(format!("Failed to delete {} {}: {}", what, path, e));
            stats.failures += 1;
        }
    }
}
