//! Structured logging.
//!
//! - [`Logger`]: level-gated logger value with immutable field chaining
//! - [`Handler`]: sink capability, [`StreamHandler`] encodes JSON or text lines
//! - [`Output`]: stdout, stderr or a size-rotated, optionally gzipped file
//! - process-wide facade: [`init`], [`info`], [`with_field`] and friends

mod bridge;
mod fields;
mod global;
mod instance;
mod level;
mod output;
mod record;
mod rotate;

pub use fields::Fields;
pub use global::{
    debug, error, get, info, init, is_initialized, log, logger, set, warn, with_error,
    with_field,
};
pub use instance::{Handler, Logger, StreamHandler};
pub use level::Level;
pub use output::Output;
pub use record::{Format, Record};
pub use rotate::{RotatingFile, RotationPolicy};
