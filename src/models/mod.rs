//! Data models shared by the services, the store, and the front end.
//!
//! - [`SyncGroup`] / [`SyncMode`]: a named source/target pair and its sync semantics
//! - [`Settings`]: paths and flags loaded by [`crate::config::ConfigManager`]
//! - [`LogLine`] / [`LogSink`] / [`OperationLog`]: the line-by-line log every operation produces

pub mod log;
pub mod settings;
pub mod sync_group;

pub use log::{LogLevel, LogLine, LogSink, NullSink, OperationLog};
pub use settings::Settings;
pub use sync_group::{SyncGroup, SyncMode};
