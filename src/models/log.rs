use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Severity tag of an operation log line.
///
/// Front ends map this to colors; the core only records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "OK",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// One user-facing line of an operation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receiver of log lines while an operation is still running.
///
/// Operations call [`LogSink::emit`] once per line, in order, and also return
/// the complete log in their report.
pub trait LogSink {
    fn emit(&mut self, line: &LogLine);
}

/// Sink that drops every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&mut self, _line: &LogLine) {}
}

impl LogSink for Vec<LogLine> {
    fn emit(&mut self, line: &LogLine) {
        self.push(line.clone());
    }
}

impl LogSink for UnboundedSender<LogLine> {
    fn emit(&mut self, line: &LogLine) {
        // The receiver may already be gone; the line is still in the report.
        let _ = self.send(line.clone());
    }
}

/// Accumulates an operation's log while forwarding each line to a sink and
/// to `tracing`.
pub struct OperationLog<'a> {
    lines: Vec<LogLine>,
    sink: &'a mut dyn LogSink,
}

impl<'a> OperationLog<'a> {
    pub fn new(sink: &'a mut dyn LogSink) -> Self {
        Self {
            lines: Vec::new(),
            sink,
        }
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let line = LogLine::new(level, message);
        match level {
            LogLevel::Error => tracing::error!("{}", line.message),
            LogLevel::Warning => tracing::warn!("{}", line.message),
            LogLevel::Info | LogLevel::Success => tracing::info!("{}", line.message),
        }
        self.sink.emit(&line);
        self.lines.push(line);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<LogLine> {
        self.lines
    }
}
