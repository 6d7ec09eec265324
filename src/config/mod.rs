//! Configuration management module.
//!
//! Handles YAML/TOML configuration file loading, environment overrides,
//! default-fill, validation and hot-reload.

mod loader;
mod manager;
mod summary;
mod types;
mod validation;

pub use loader::{is_not_found, ConfigLoader, ENV_OVERRIDES};
pub use manager::ConfigManager;
pub use summary::{mask_secret, ConfigSummary};
pub use types::{
    AppConfig, Config, DatabaseConfig, Environment, FileConfig, JwtConfig, LogConfig, RedisConfig,
};
pub use validation::{check_business_rules, check_fields, validate};
