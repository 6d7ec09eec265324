//! Configuration loader: read, overlay environment, default-fill, validate.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Config;
use crate::error::{Error, Result};

/// Environment variables that override file values, with the dotted field they replace.
pub const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("MOVIEINFO_DATABASE_PASSWORD", "database.password"),
    ("MOVIEINFO_REDIS_PASSWORD", "redis.password"),
    ("MOVIEINFO_JWT_SECRET", "jwt.secret"),
];

/// Configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the default configuration file path.
    ///
    /// `configs/config.yaml` in the working directory when it exists, otherwise
    /// `<user config dir>/movieinfo/config.yaml`.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from("configs").join("config.yaml");
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("movieinfo")
            .join("config.yaml")
    }

    /// Load configuration from file using the process environment for overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Load configuration from file, resolving override variables through `lookup`.
    ///
    /// Returns the fully defaulted and validated snapshot, or the first failing
    /// stage's error. No partial snapshot is ever returned.
    pub fn load_with_env<F>(path: impl AsRef<Path>, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|source| Error::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tree = parse_document(path, &content)?;
        let overridden = overlay_env(&mut tree, &lookup);

        let mut config: Config =
            serde_json::from_value(tree).map_err(|e| Error::parse(path, e))?;

        config.apply_defaults();
        config.validate()?;

        debug!(
            path = %path.display(),
            environment = %config.app.environment,
            env_overrides = overridden,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Generate the sample configuration file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, Self::default_config_content()).map_err(|e| Error::io(path, e))
    }

    /// Sample configuration content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# movieinfo configuration file
# Secrets may be supplied through the environment instead of this file:
#   MOVIEINFO_DATABASE_PASSWORD, MOVIEINFO_REDIS_PASSWORD, MOVIEINFO_JWT_SECRET

app:
  name: "movieinfo"
  version: "1.0.0"
  # development | testing | production
  environment: "development"
  debug: true
  port: 8080

database:
  driver: "mysql"
  host: "localhost"
  port: 3306
  username: "root"
  # Required outside test environments
  password: ""
  database: "movieinfo"
  charset: "utf8mb4"
  max_open_conns: 100
  max_idle_conns: 10

redis:
  host: "localhost"
  port: 6379
  password: ""
  database: 0

log:
  # debug | info | warn | error
  level: "info"
  # json | text
  format: "json"
  # stdout | stderr | file
  output: "stdout"
  file:
    path: "logs/app.log"
    max_size: 100     # MB
    max_backups: 10
    max_age: 30       # days
    compress: true

jwt:
  # Required
  secret: ""
  expire_time: "24h"
  issuer: "movieinfo"
"#
    }
}

/// Parse the document into a neutral tree, dispatching on file extension.
fn parse_document(path: &Path, content: &str) -> Result<Value> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if content.trim().is_empty() && matches!(ext.as_str(), "yaml" | "yml" | "toml" | "json") {
        return Ok(Value::Object(Map::new()));
    }

    let tree: Value = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| Error::parse(path, e))?,
        "toml" => toml::from_str(content).map_err(|e| Error::parse(path, e))?,
        "json" => serde_json::from_str(content).map_err(|e| Error::parse(path, e))?,
        _ => {
            return Err(Error::parse(
                path,
                format!("unsupported configuration format '.{ext}' (expected yaml, toml or json)"),
            ))
        }
    };

    match tree {
        Value::Object(_) => Ok(tree),
        // A comment-only YAML document parses as null
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(Error::parse(path, "top level must be a mapping")),
    }
}

/// Apply environment overrides to the tree. Returns how many variables were applied.
fn overlay_env<F>(tree: &mut Value, lookup: &F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    for (var, field) in ENV_OVERRIDES {
        let Some(value) = lookup(var).filter(|v| !v.is_empty()) else {
            continue;
        };
        if set_path(tree, field, Value::String(value)) {
            applied += 1;
        }
    }
    applied
}

/// Set a dotted path, creating intermediate mappings. Returns false when a
/// non-mapping value is in the way.
fn set_path(tree: &mut Value, dotted: &str, value: Value) -> bool {
    let mut node = tree;
    let mut parts = dotted.split('.').peekable();
    while let Some(part) = parts.next() {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return false;
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return true;
        }
        node = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    false
}

/// True when the error came from a missing or unreadable file.
pub fn is_not_found(err: &Error) -> bool {
    matches!(err, Error::ConfigNotFound { source, .. } if source.kind() == io::ErrorKind::NotFound)
}
