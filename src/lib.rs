//! movieinfo: service configuration and structured logging.
//!
//! Two contracts are exposed to the rest of the service:
//!
//! - [`config`]: load a YAML/TOML file, overlay secret environment variables,
//!   fill defaults, validate, and hot-reload through [`ConfigManager`].
//! - [`logger`]: level-gated structured logging to stdout, stderr or a
//!   rotating file, as an injectable [`Logger`] value or a process-wide facade.
//!
//! ```no_run
//! use movieinfo::{config::ConfigManager, logger};
//!
//! let manager = ConfigManager::new("configs/config.yaml")?;
//! logger::init(&manager.log_config())?;
//!
//! logger::with_field("request_id", "req-123").info("request handled");
//! movieinfo::infof!("listening on port {}", manager.get().app.port);
//! # Ok::<(), movieinfo::Error>(())
//! ```

pub mod config;
mod error;
pub mod logger;

pub use config::{Config, ConfigLoader, ConfigManager};
pub use error::{Error, Result, Violation, Violations};
pub use logger::{Level, Logger};
