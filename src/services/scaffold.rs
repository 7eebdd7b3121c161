//! Tree scaffolding from an indented text description.
//!
//! Each non-blank line names one entry. Hierarchy is encoded by leading
//! whitespace in units of [`INDENT_WIDTH`]; a name containing `.` is a file,
//! anything else a directory:
//!
//! ```text
//! proj
//!     src
//!         main.py
//!     README.md
//! ```
//!
//! The description is parsed into a complete plan first, so malformed
//! indentation rejects the whole description before anything is created.
//! Creation itself is best-effort per line.

use crate::models::{LogLine, LogSink, OperationLog};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fs::{self, OpenOptions};
use thiserror::Error;

/// Width of one indentation level, in whitespace characters
pub const INDENT_WIDTH: usize = 4;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Scaffold root does not exist or is not a directory: {0}")]
    RootNotFound(Utf8PathBuf),

    #[error("Failed to read tree description {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: indentation changes by {delta} characters, not a multiple of 4")]
    MisalignedIndent { line: usize, delta: usize },

    #[error("Line {line}: indented more than one level below the previous entry")]
    IndentJump { line: usize },

    #[error("Line {line}: indented entry has no parent entry")]
    Orphan { line: usize },

    #[error("Line {line}: entry '{name}' must be a plain relative name")]
    InvalidName { line: usize, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    /// Names containing a `.` are files; everything else is a directory.
    pub fn classify(name: &str) -> Self {
        if name.contains('.') {
            NodeKind::File
        } else {
            NodeKind::Directory
        }
    }
}

/// A pending entry of the scaffold plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldNode {
    /// 1-based line number in the description
    pub line: usize,
    /// Nesting depth below the root (top-level entries are 0)
    pub depth: usize,
    pub path: Utf8PathBuf,
    pub kind: NodeKind,
}

/// Outcome of a scaffold run
#[derive(Debug, Clone, Default)]
pub struct ScaffoldReport {
    pub dirs_created: usize,
    pub files_created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub log: Vec<LogLine>,
}

impl ScaffoldReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Parse `description` into creation steps under `root`.
///
/// Pure: touches no filesystem state.
pub fn plan_scaffold(root: &Utf8Path, description: &str) -> Result<Vec<ScaffoldNode>, ScaffoldError> {
    // Each frame is (indent of the entries it contains, directory path)
    let mut stack: Vec<(usize, Utf8PathBuf)> = vec![(0, root.to_path_buf())];
    let mut previous_indent = 0usize;
    let mut last_created: Option<Utf8PathBuf> = None;
    let mut plan = Vec::new();

    for (idx, raw) in description.lines().enumerate() {
        let line_no = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let name = raw.trim();
        let current_indent = raw.chars().take_while(|c| c.is_whitespace()).count();

        if current_indent > previous_indent {
            let delta = current_indent - previous_indent;
            if delta % INDENT_WIDTH != 0 {
                return Err(ScaffoldError::MisalignedIndent { line: line_no, delta });
            }
            if delta > INDENT_WIDTH {
                return Err(ScaffoldError::IndentJump { line: line_no });
            }
            let parent = last_created
                .clone()
                .ok_or(ScaffoldError::Orphan { line: line_no })?;
            stack.push((current_indent, parent));
        } else if current_indent < previous_indent {
            let delta = previous_indent - current_indent;
            if delta % INDENT_WIDTH != 0 {
                return Err(ScaffoldError::MisalignedIndent { line: line_no, delta });
            }
            for _ in 0..delta / INDENT_WIDTH {
                stack.pop();
            }
        }

        validate_name(name, line_no)?;

        let (_, parent) = stack
            .last()
            .ok_or(ScaffoldError::Orphan { line: line_no })?;
        let path = parent.join(name);

        plan.push(ScaffoldNode {
            line: line_no,
            depth: stack.len() - 1,
            path: path.clone(),
            kind: NodeKind::classify(name),
        });

        last_created = Some(path);
        previous_indent = current_indent;
    }

    Ok(plan)
}

fn validate_name(name: &str, line: usize) -> Result<(), ScaffoldError> {
    let mut components = Utf8Path::new(name).components();
    let plain = matches!(components.next(), Some(Utf8Component::Normal(_))) && components.next().is_none();
    if plain {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName {
            line,
            name: name.to_string(),
        })
    }
}

/// Create the tree described by `description` under `root`.
pub fn scaffold(
    root: &Utf8Path,
    description: &str,
    sink: &mut dyn LogSink,
) -> Result<ScaffoldReport, ScaffoldError> {
    if !root.is_dir() {
        return Err(ScaffoldError::RootNotFound(root.to_path_buf()));
    }

    let plan = plan_scaffold(root, description)?;
    tracing::debug!("Scaffold plan for {} has {} entries", root, plan.len());

    let mut log = OperationLog::new(sink);
    let mut report = ScaffoldReport::default();

    for node in &plan {
        match node.kind {
            NodeKind::File => {
                if node.path.exists() {
                    log.info(format!("File already exists, skipped: {}", node.path));
                    report.skipped += 1;
                    continue;
                }
                match OpenOptions::new().write(true).create_new(true).open(&node.path) {
                    Ok(_) => {
                        log.success(format!("Created file: {}", node.path));
                        report.files_created += 1;
                    }
                    Err(e) => {
                        log.error(format!("Failed to create file {}: {}", node.path, e));
                        report.failed += 1;
                    }
                }
            }
            NodeKind::Directory => {
                if node.path.exists() {
                    log.info(format!("Directory already exists, skipped: {}", node.path));
                    report.skipped += 1;
                    continue;
                }
                match fs::create_dir_all(&node.path) {
                    Ok(()) => {
                        log.success(format!("Created directory: {}", node.path));
                        report.dirs_created += 1;
                    }
                    Err(e) => {
                        log.error(format!("Failed to create directory {}: {}", node.path, e));
                        report.failed += 1;
                    }
                }
            }
        }
    }

    tracing::info!(
        "Scaffold finished: {} directories and {} files created, {} skipped, {} failed",
        report.dirs_created,
        report.files_created,
        report.skipped,
        report.failed
    );
    report.log = log.into_lines();
    Ok(report)
}

/// Read a description file and scaffold it under `root`.
pub fn scaffold_from_file(
    root: &Utf8Path,
    description_path: &Utf8Path,
    sink: &mut dyn LogSink,
) -> Result<ScaffoldReport, ScaffoldError> {
    let description = fs::read_to_string(description_path).map_err(|source| ScaffoldError::Read {
        path: description_path.to_path_buf(),
        source,
    })?;
    scaffold(root, &description, sink)
}
