//! CLI argument parsing via `clap`.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use fileproc::SyncMode;

#[derive(Parser, Debug)]
#[command(name = "fileproc", version, about = "Directory scaffolding, sync and bulk rename")]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Directory holding fileproc.yaml
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: Utf8PathBuf,

    /// Also print diagnostics to stderr
    #[arg(long, short, global = true, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

/// Log export shared by the operations that produce a log.
#[derive(Args, Debug, Default)]
pub struct LogExport {
    /// Write the operation log to this file
    #[arg(long)]
    pub save_log: Option<Utf8PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a directory tree
    Tree { root: Utf8PathBuf },
    /// Create directories and files from an indented description
    Scaffold {
        /// Directory to create the tree under
        root: Utf8PathBuf,
        /// Description file (4 spaces per level; names with '.' are files)
        description: Utf8PathBuf,
        #[command(flatten)]
        export: LogExport,
    },
    /// Reconcile a target directory with a source directory
    Sync {
        source: Utf8PathBuf,
        target: Utf8PathBuf,
        /// incremental, one-way or mirror
        #[arg(long, default_value = "incremental")]
        mode: SyncMode,
        #[command(flatten)]
        export: LogExport,
    },
    /// Rename files from a two-column CSV/TSV mapping
    Rename {
        root: Utf8PathBuf,
        mapping: Utf8PathBuf,
        #[command(flatten)]
        export: LogExport,
    },
    /// Change file extensions recursively
    Ext {
        root: Utf8PathBuf,
        from: String,
        to: String,
        #[command(flatten)]
        export: LogExport,
    },
    /// Manage saved sync groups
    Group {
        #[command(subcommand)]
        cmd: GroupCmd,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupCmd {
    /// List saved groups
    List,
    /// Create or replace a group
    Save {
        name: String,
        source: Utf8PathBuf,
        target: Utf8PathBuf,
        #[arg(long, default_value = "incremental")]
        mode: SyncMode,
    },
    /// Delete a group
    Delete { name: String },
    /// Run a saved group
    Run {
        name: String,
        #[command(flatten)]
        export: LogExport,
    },
}
