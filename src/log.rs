use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub const LOG_FILE: &str = "gameshelf.log";
const LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: String,
    pub message: String,
}

/// Recent log entries, mirrored to an append-only file when a path is set.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            path,
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(Some(dir.join(LOG_FILE)))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn info(&mut self, message: String) {
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: String) {
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: String) {
        self.push(LogLevel::Error, message);
    }

    fn push(&mut self, level: LogLevel, message: String) {
        let timestamp = now_timestamp();
        if let Some(path) = &self.path {
            let _ = append_log_file(path, level, &timestamp, &message);
        }

        self.entries.push(LogEntry {
            level,
            timestamp,
            message,
        });

        if self.entries.len() > LOG_CAPACITY {
            let overflow = self.entries.len() - LOG_CAPACITY;
            self.entries.drain(0..overflow);
        }
    }
}

pub fn log_level_label(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "INFO",
        LogLevel::Warn => "WARN",
        LogLevel::Error => "ERROR",
    }
}

fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn append_log_file(
    path: &Path,
    level: LogLevel,
    timestamp: &str,
    message: &str,
) -> std::io::Result<()> {
    let label = log_level_label(level);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{timestamp} [{label}] {message}")
}
