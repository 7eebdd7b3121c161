use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use super::scaffold::INDENT_WIDTH;

/// One entry of a recursive directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Depth below the listed root (direct children are 0)
    pub depth: usize,
    pub name: String,
    pub path: Utf8PathBuf,
    pub is_dir: bool,
}

/// List everything under `root`, sorted by name, directories before their
/// contents.
///
/// Unreadable subdirectories are reported through `tracing` and skipped.
pub fn list_tree(root: &Utf8Path) -> Result<Vec<TreeEntry>> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root);
    }

    let mut entries = Vec::new();
    for item in WalkDir::new(root).sort_by_file_name() {
        let item = match item {
            Ok(item) => item,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to read directory: {}", root));
            }
            Err(e) => {
                tracing::warn!("Cannot access entry under {}: {}", root, e);
                continue;
            }
        };
        if item.depth() == 0 {
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(item.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("Non UTF-8 path: {}", p.display()))?;
        entries.push(TreeEntry {
            depth: item.depth() - 1,
            name: path.file_name().unwrap_or_default().to_string(),
            is_dir: item.file_type().is_dir(),
            path,
        });
    }

    Ok(entries)
}

/// Render a listing as indented lines, marking directories with `[DIR]`.
pub fn render_tree(entries: &[TreeEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let indent = " ".repeat(entry.depth * INDENT_WIDTH);
            if entry.is_dir {
                format!("{}[DIR] {}", indent, entry.name)
            } else {
                format!("{}{}", indent, entry.name)
            }
        })
        .collect()
}
