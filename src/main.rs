//! fileproc - command-line front end.
//!
//! # Execution Flow
//!
//! 1. Parse arguments and load settings from `<config-dir>/fileproc.yaml`
//! 2. Initialize logging → `<log_dir>/<log_prefix>.<date>`
//! 3. Build the [`AppContext`] (sync group store, sync log file)
//! 4. Run the requested operation on the background [`Worker`], printing log
//!    lines as they arrive
//!
//! The process exits with status 1 on input or fatal errors and when any
//! entry failed.

mod cli;
mod output;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use cli::{Cli, Commands, GroupCmd, LogExport};
use fileproc::services::{list_tree, read_mapping, render_tree};
use fileproc::store::StoreError;
use fileproc::worker::Task;
use fileproc::{APP_NAME, AppContext, ConfigManager, LogLine, SyncGroup, VERSION, Worker};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Shared state for one invocation
struct App {
    runtime: Runtime,
    worker: Worker,
    ctx: Arc<AppContext>,
    color: bool,
}

impl App {
    /// Drive `task` to completion, printing each line as it arrives.
    fn stream<T>(&self, task: Task<T>) -> Result<T> {
        let color = self.color;
        let result = self
            .runtime
            .block_on(task.run_to_end(|line| output::print_line(line, color)))?;
        Ok(result)
    }

    fn export(&self, export: &LogExport, lines: &[LogLine]) -> Result<()> {
        match &export.save_log {
            Some(path) => output::save_log(path, lines),
            None => Ok(()),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let settings = config_manager.load_settings()?;

    let _guard = fileproc::logging::setup_logging_with_console(
        &settings.log_dir,
        &settings.log_prefix,
        settings.debug,
        cli.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("fileproc-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let app = App {
        worker: Worker::new(runtime.handle().clone()),
        runtime,
        ctx: AppContext::from_settings(&settings).shared(),
        color: output::use_colors(),
    };

    let result = run(&app, cli.cmd);
    app.runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    match result {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => {
            tracing::warn!("Finished with failures");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            Err(e)
        }
    }
}

/// Run one command; `Ok(false)` means it completed with failures.
fn run(app: &App, cmd: Commands) -> Result<bool> {
    match cmd {
        Commands::Tree { root } => {
            let entries = list_tree(&root)?;
            println!("{}", root);
            for line in render_tree(&entries) {
                println!("{}", line);
            }
            Ok(true)
        }
        Commands::Scaffold {
            root,
            description,
            export,
        } => {
            let text = fs::read_to_string(&description)
                .with_context(|| format!("Failed to read description: {}", description))?;
            let report = app.stream(app.worker.scaffold(root, text))??;
            output::print_summary(
                &format!(
                    "Scaffold finished: {} directories, {} files created, {} skipped, {} failed",
                    report.dirs_created, report.files_created, report.skipped, report.failed
                ),
                app.color,
            );
            app.export(&export, &report.log)?;
            Ok(!report.has_failures())
        }
        Commands::Sync {
            source,
            target,
            mode,
            export,
        } => {
            let report = app.stream(app.worker.reconcile(app.ctx.clone(), source, target, mode))??;
            app.export(&export, &report.log)?;
            Ok(report.is_success())
        }
        Commands::Rename {
            root,
            mapping,
            export,
        } => {
            let entries = read_mapping(&mapping)?;
            let report = app.stream(app.worker.rename(root, entries))??;
            app.export(&export, &report.log)?;
            Ok(report.failure_count == 0)
        }
        Commands::Ext {
            root,
            from,
            to,
            export,
        } => {
            let report = app.stream(app.worker.change_extensions(root, from, to))??;
            output::print_summary(
                &format!("Extension change finished: {} renamed, {} failed", report.renamed, report.failed),
                app.color,
            );
            app.export(&export, &report.log)?;
            Ok(report.failed == 0)
        }
        Commands::Group { cmd } => run_group(app, cmd),
    }
}

fn run_group(app: &App, cmd: GroupCmd) -> Result<bool> {
    let store = &app.ctx.store;
    match cmd {
        GroupCmd::List => {
            let groups = store.load();
            if groups.is_empty() {
                println!("No sync groups saved in {}", store.path());
            }
            for group in groups.values() {
                println!("{} [{}] {} -> {}", group.name, group.mode, group.source, group.target);
            }
            Ok(true)
        }
        GroupCmd::Save {
            name,
            source,
            target,
            mode,
        } => {
            let group = SyncGroup::new(name, absolute(source)?, absolute(target)?, mode);
            let name = group.name.clone();
            store.upsert(group)?;
            println!("Saved sync group '{}'", name.trim());
            Ok(true)
        }
        GroupCmd::Delete { name } => {
            if !store.delete(&name)? {
                return Err(StoreError::NotFound(name).into());
            }
            println!("Deleted sync group '{}'", name);
            Ok(true)
        }
        GroupCmd::Run { name, export } => {
            let report = app.stream(app.worker.reconcile_group(app.ctx.clone(), name))??;
            app.export(&export, &report.log)?;
            Ok(report.is_success())
        }
    }
}

/// Resolve a relative path against the working directory.
fn absolute(path: Utf8PathBuf) -> Result<Utf8PathBuf> {
    if path.as_str().trim().is_empty() || path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;
    Ok(cwd.join(path))
}
