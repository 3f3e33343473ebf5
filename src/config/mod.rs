//! Runtime configuration
//!
//! Settings come from the environment first (`LOX_LOG`, `NO_COLOR`) and are
//! then overridden by command-line flags.

use crate::error::{LoxError, LoxResult};
use crate::logging::{Level, Logger, NullLogger, StderrLogger};

/// Environment variable holding the log level
pub const LOG_ENV: &str = "LOX_LOG";

/// Front end configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum log level; `None` disables logging
    pub log_level: Option<Level>,
    /// Whether terminal output may use colours
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            color: true,
        }
    }
}

impl Config {
    /// Build a configuration from environment lookups
    ///
    /// Takes a lookup function so tests can supply their own environment.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> LoxResult<Self> {
        let log_level = match lookup(LOG_ENV) {
            Some(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<Level>()
                    .map_err(|e| LoxError::usage_error(format!("{}: {}", LOG_ENV, e)))?,
            ),
            _ => None,
        };
        let color = lookup("NO_COLOR").map_or(true, |v| v.is_empty());

        Ok(Self { log_level, color })
    }

    /// Build a configuration from the process environment
    pub fn from_env() -> LoxResult<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Apply a `--log <level>` flag
    pub fn set_log_level(&mut self, value: &str) -> LoxResult<()> {
        self.log_level = Some(value.parse::<Level>().map_err(LoxError::usage_error)?);
        Ok(())
    }

    /// Apply one `-v`: raise verbosity by a single level
    pub fn increase_verbosity(&mut self) {
        self.log_level = Some(match self.log_level {
            None => Level::Info,
            Some(Level::Error) => Level::Warn,
            Some(Level::Warn) => Level::Info,
            Some(Level::Info) => Level::Debug,
            Some(Level::Debug) | Some(Level::Trace) => Level::Trace,
        });
    }

    /// Construct the logger this configuration asks for
    pub fn logger(&self) -> Box<dyn Logger> {
        match self.log_level {
            Some(level) => Box::new(StderrLogger::new(level)),
            None => Box::new(NullLogger),
        }
    }
}
