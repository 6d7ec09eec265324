//! Chainable structured logger value and its sink capability.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::fields::Fields;
use super::level::Level;
use super::output::Output;
use super::record::{Format, Record};
use crate::config::LogConfig;
use crate::error::Result;

/// Sink capability: receives every record that passed the level gate.
///
/// Implementations must not fail the caller; write errors are dropped.
pub trait Handler: Send + Sync {
    fn handle(&self, record: &Record<'_>);
}

/// Encodes records with a [`Format`] and writes them to an [`Output`].
#[derive(Debug, Clone)]
pub struct StreamHandler {
    format: Format,
    output: Output,
}

impl StreamHandler {
    pub fn new(format: Format, output: Output) -> Self {
        Self { format, output }
    }

    /// Handler for the configured format and output. Creates the log directory
    /// for file output; an unrecognised format falls back to `json`.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        let format = config.format.parse().unwrap_or_default();
        Ok(Self::new(format, Output::from_config(config)?))
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl Handler for StreamHandler {
    fn handle(&self, record: &Record<'_>) {
        // Write errors are dropped.
        let _ = self.output.write_record(&self.format.encode(record));
    }
}

struct Discard;

impl Handler for Discard {
    fn handle(&self, _record: &Record<'_>) {}
}

/// Logger value: level threshold, shared handler and an immutable field set.
///
/// Cloning is cheap. [`Logger::with_field`] returns a new logger and never
/// changes the receiver, so one base logger can be branched from many threads.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
    level: Level,
    fields: Fields,
}

impl Logger {
    pub fn new(handler: Arc<dyn Handler>, level: Level) -> Self {
        Self {
            handler,
            level,
            fields: Fields::new(),
        }
    }

    /// Build the configured logger. Creates the log directory for file output.
    ///
    /// Unrecognised level or format values fall back to `info` and `json`.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        let handler = StreamHandler::from_config(config)?;
        Ok(Self::new(Arc::new(handler), configured_level(config)))
    }

    /// Logger that drops every record.
    pub fn discard() -> Self {
        Self::new(Arc::new(Discard), Level::Error)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// New logger with `key` added; an inherited field of the same name is overridden.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            level: self.level,
            fields: self.fields.with(key, value),
        }
    }

    /// Shorthand for `with_field("error", err.to_string())`.
    pub fn with_error(&self, err: impl fmt::Display) -> Self {
        self.with_field("error", err.to_string())
    }

    /// Emit `message` at `level` if it passes the threshold.
    ///
    /// The message is only formatted when the record is emitted, so
    /// `format_args!` can be passed without cost for filtered records.
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        let message = message.to_string();
        self.handler
            .handle(&Record::now(level, &message, &self.fields));
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message);
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }
}

/// Configured threshold; an unrecognised level falls back to `info`.
pub(crate) fn configured_level(config: &LogConfig) -> Level {
    config.level.parse().unwrap_or_default()
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
