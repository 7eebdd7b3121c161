//! Terminal rendering of operation logs.

use anyhow::{Context, Result};
use camino::Utf8Path;
use fileproc::{LogLevel, LogLine};
use owo_colors::OwoColorize;
use std::fs;

pub fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn severity(level: LogLevel, color: bool) -> String {
    let tag = format!("[{}]", level.tag());
    if !color {
        return tag;
    }
    match level {
        LogLevel::Info => tag.blue().bold().to_string(),
        LogLevel::Success => tag.green().bold().to_string(),
        LogLevel::Warning => tag.yellow().bold().to_string(),
        LogLevel::Error => tag.red().bold().to_string(),
    }
}

/// Print one log line to stdout.
pub fn print_line(line: &LogLine, color: bool) {
    println!("{} {}", severity(line.level, color), line.message);
}

/// Print a closing summary in bold.
pub fn print_summary(summary: &str, color: bool) {
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

/// Write `lines` to `path`, replacing any existing file.
pub fn save_log(path: &Utf8Path, lines: &[LogLine]) -> Result<()> {
    let mut text = String::new();
    for line in lines {
        text.push_str(&format!("[{}] {}\n", line.level.tag(), line.message));
    }
    fs::write(path, text).with_context(|| format!("Failed to save log to {}", path))?;
    tracing::info!("Saved operation log to {}", path);
    Ok(())
}
