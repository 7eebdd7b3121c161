//! Services module - the filesystem operations behind every front-end action.
//!
//! The services are **framework-agnostic**: each takes plain paths and a
//! [`LogSink`](crate::models::LogSink), performs its work synchronously, and
//! returns a report carrying counters plus the complete log.
//!
//! # Components
//!
//! - [`reconcile`]: directory synchronization in Incremental, OneWay or Mirror mode
//! - [`scaffold`]: create a directory/file tree from an indented text description
//! - [`rename`]: bulk renaming from a two-column mapping file
//! - [`extension`]: bulk file extension changes
//! - [`listing`]: recursive directory listing
//!
//! # Error policy
//!
//! Input errors and failures at the start of an operation are returned as
//! `Err`. Failures on a single entry become an error line in the log and a
//! counter in the report; the operation moves on to the next entry.
//!
//! For a responsive front end, run these through [`crate::worker::Worker`],
//! which executes them on a blocking thread and streams log lines back over a
//! channel.

pub mod extension;
pub mod listing;
pub mod reconcile;
pub mod rename;
pub mod scaffold;

pub use extension::{ExtensionError, ExtensionReport, change_extensions};
pub use listing::{TreeEntry, list_tree, render_tree};
pub use reconcile::{ReconcileError, ReconcileReport, ReconcileStats, reconcile, reconcile_group};
pub use rename::{RenameEntry, RenameError, RenameReport, apply_renames, read_mapping, rename_from_mapping};
pub use scaffold::{
    INDENT_WIDTH, NodeKind, ScaffoldError, ScaffoldNode, ScaffoldReport, plan_scaffold, scaffold,
    scaffold_from_file,
};
