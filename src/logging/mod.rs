//! Structured logging for the front end
//!
//! The scanner and parser take a `&dyn Logger` at construction time instead
//! of consulting global state. A record carries a level, a target naming the
//! component that produced it, a message, and key/value fields.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use colored::Colorize;

/// Severity of a log record, least verbose first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("Unknown log level '{}'", other)),
        }
    }
}

/// A single structured log record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub target: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl Record {
    pub fn new(level: Level, target: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            target,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a key/value field
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// Render as `level target: message key=value ...`
    pub fn format_line(&self) -> String {
        format!("{} {}", self.level, self.format_body())
    }

    /// Everything after the level: `target: message key=value ...`
    pub fn format_body(&self) -> String {
        let mut body = format!("{}: {}", self.target, self.message);
        for (key, value) in &self.fields {
            body.push_str(&format!(" {}={}", key, value));
        }
        body
    }
}

/// Sink for structured records
pub trait Logger {
    /// Whether records at `level` would be kept
    fn enabled(&self, level: Level) -> bool;

    /// Consume a record; callers check `enabled` first to avoid building it
    fn log(&self, record: Record);
}

/// Emit a record, building its fields only when `level` is enabled
pub fn emit(
    logger: &dyn Logger,
    level: Level,
    target: &'static str,
    message: &str,
    fields: impl FnOnce(Record) -> Record,
) {
    if logger.enabled(level) {
        logger.log(fields(Record::new(level, target, message)));
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn enabled(&self, _level: Level) -> bool {
        false
    }

    fn log(&self, _record: Record) {}
}

/// Writes records to stderr, filtered by a maximum level
#[derive(Debug, Clone, Copy)]
pub struct StderrLogger {
    max_level: Level,
}

impl StderrLogger {
    pub fn new(max_level: Level) -> Self {
        Self { max_level }
    }
}

impl Logger for StderrLogger {
    fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    fn log(&self, record: Record) {
        if !self.enabled(record.level) {
            return;
        }
        let level = match record.level {
            Level::Error => record.level.as_str().red().bold(),
            Level::Warn => record.level.as_str().yellow().bold(),
            Level::Info => record.level.as_str().green(),
            Level::Debug => record.level.as_str().blue(),
            Level::Trace => record.level.as_str().dimmed(),
        };
        eprintln!("[{}] {}", level, record.format_body());
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: RefCell<Vec<Record>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, oldest first
    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    /// Records emitted by one component
    pub fn records_for(&self, target: &str) -> Vec<Record> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.target == target)
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn log(&self, record: Record) {
        self.records.borrow_mut().push(record);
    }
}
