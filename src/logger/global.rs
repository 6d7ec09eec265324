//! Process-wide logger.
//!
//! A thin convenience layer over an injectable [`Logger`]. Until [`init`] (or
//! [`set`]) runs, every call here is a silent no-op.

use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::bridge;
use super::instance::{configured_level, Logger, StreamHandler};
use super::level::Level;
use crate::config::LogConfig;
use crate::error::Result;

static GLOBAL: RwLock<Option<Logger>> = parking_lot::const_rwlock(None);

/// Initialize the process-wide logger from configuration.
///
/// Creates the log directory for file output, builds the handler for the
/// configured format and publishes the logger. The crate's `tracing`
/// diagnostics follow the same destination, format and level, and are
/// re-pointed on every call.
///
/// Loggers obtained before a repeated `init` keep writing to the previous
/// destination. When both point at the same file each handle tracks its own
/// size, so drop old loggers before re-initializing with a rotating file.
pub fn init(config: &LogConfig) -> Result<()> {
    let level = configured_level(config);
    let handler = StreamHandler::from_config(config)?;
    bridge::route(level, handler.format(), handler.output().clone());
    set(Logger::new(Arc::new(handler), level));
    Ok(())
}

/// Publish `logger` as the process-wide logger, replacing any previous one.
pub fn set(logger: Logger) {
    *GLOBAL.write() = Some(logger);
}

/// Current process-wide logger, if initialized.
pub fn get() -> Option<Logger> {
    GLOBAL.read().clone()
}

pub fn is_initialized() -> bool {
    GLOBAL.read().is_some()
}

/// Current process-wide logger, or a discarding one before initialization.
pub fn logger() -> Logger {
    get().unwrap_or_else(Logger::discard)
}

pub fn log(level: Level, message: impl fmt::Display) {
    if let Some(logger) = get() {
        logger.log(level, message);
    }
}

pub fn debug(message: impl fmt::Display) {
    log(Level::Debug, message);
}

pub fn info(message: impl fmt::Display) {
    log(Level::Info, message);
}

pub fn warn(message: impl fmt::Display) {
    log(Level::Warn, message);
}

pub fn error(message: impl fmt::Display) {
    log(Level::Error, message);
}

pub fn with_field(key: impl Into<String>, value: impl Into<Value>) -> Logger {
    logger().with_field(key, value)
}

pub fn with_error(err: impl fmt::Display) -> Logger {
    logger().with_error(err)
}

/// Formatted debug record on the process-wide logger.
#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::logger::debug(::std::format_args!($($arg)+))
    };
}

/// Formatted info record on the process-wide logger.
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::logger::info(::std::format_args!($($arg)+))
    };
}

/// Formatted warn record on the process-wide logger.
#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::logger::warn(::std::format_args!($($arg)+))
    };
}

/// Formatted error record on the process-wide logger.
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::logger::error(::std::format_args!($($arg)+))
    };
}
