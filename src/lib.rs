// fileproc - file processing utilities
//
// This is the library crate containing the core operations and data structures.
// The binary crate (main.rs) provides the command-line front end.

pub mod config;
pub mod context;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod worker;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use context::AppContext;
pub use models::{LogLevel, LogLine, Settings, SyncGroup, SyncMode};
pub use store::SyncGroupStore;
pub use worker::Worker;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
