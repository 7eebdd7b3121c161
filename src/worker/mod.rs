// Background execution of core operations
//
// The services are blocking and synchronous. The Worker runs them on tokio's
// blocking pool and hands back a Task whose channel yields log lines as they
// are produced, so a front end can keep rendering while a long sync runs.

use crate::context::AppContext;
use crate::models::{LogLine, LogSink, SyncMode};
use crate::services::{
    self, ExtensionError, ExtensionReport, ReconcileError, ReconcileReport, RenameEntry,
    RenameError, RenameReport, ScaffoldError, ScaffoldReport,
};
use camino::Utf8PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::{JoinError, JoinHandle};

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Background task failed: {0}")]
    Join(#[from] JoinError),
}

/// A running background operation.
///
/// Log lines arrive on [`Task::next_line`] in order; the channel closes when
/// the operation returns.
pub struct Task<T> {
    lines: UnboundedReceiver<LogLine>,
    handle: JoinHandle<T>,
}

impl<T> Task<T> {
    /// Next log line, or `None` once the operation has finished.
    pub async fn next_line(&mut self) -> Option<LogLine> {
        self.lines.recv().await
    }

    /// Wait for the result, discarding lines not yet received.
    pub async fn finish(self) -> Result<T, WorkerError> {
        Ok(self.handle.await?)
    }

    /// Feed every line to `on_line`, then return the result.
    pub async fn run_to_end<F>(mut self, mut on_line: F) -> Result<T, WorkerError>
    where
        F: FnMut(&LogLine),
    {
        while let Some(line) = self.lines.recv().await {
            on_line(&line);
        }
        Ok(self.handle.await?)
    }
}

/// Spawns core operations onto a tokio runtime's blocking pool.
///
/// No cancellation: once spawned an operation runs to completion or to a
/// fatal error.
#[derive(Clone)]
pub struct Worker {
    handle: Handle,
}

impl Worker {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Worker on the runtime of the calling task.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    fn spawn<T, F>(&self, job: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn LogSink) -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.handle.spawn_blocking(move || {
            let mut tx = tx;
            job(&mut tx)
        });
        Task { lines: rx, handle }
    }

    pub fn reconcile(
        &self,
        ctx: Arc<AppContext>,
        source: Utf8PathBuf,
        target: Utf8PathBuf,
        mode: SyncMode,
    ) -> Task<Result<ReconcileReport, ReconcileError>> {
        self.spawn(move |sink| services::reconcile(&ctx, &source, &target, mode, sink))
    }

    pub fn reconcile_group(
        &self,
        ctx: Arc<AppContext>,
        name: String,
    ) -> Task<Result<ReconcileReport, ReconcileError>> {
        self.spawn(move |sink| services::reconcile_group(&ctx, &name, sink))
    }

    pub fn scaffold(
        &self,
        root: Utf8PathBuf,
        description: String,
    ) -> Task<Result<ScaffoldReport, ScaffoldError>> {
        self.spawn(move |sink| services::scaffold(&root, &description, sink))
    }

    pub fn rename(
        &self,
        root: Utf8PathBuf,
        entries: Vec<RenameEntry>,
    ) -> Task<Result<RenameReport, RenameError>> {
        self.spawn(move |sink| services::apply_renames(&root, &entries, sink))
    }

    pub fn change_extensions(
        &self,
        root: Utf8PathBuf,
        from: String,
        to: String,
    ) -> Task<Result<ExtensionReport, ExtensionError>> {
        self.spawn(move |sink| services::change_extensions(&root, &from, &to, sink))
    }
}
