//! Configuration data types.
//!
//! Every struct deserializes with `#[serde(default)]` so fields absent from the
//! file stay zero-valued until [`Config::apply_defaults`] fills them.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default listen port for the application.
pub const DEFAULT_PORT: u32 = 8080;
pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_MAX_OPEN_CONNS: u32 = 100;
pub const DEFAULT_MAX_IDLE_CONNS: u32 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "json";
pub const DEFAULT_LOG_OUTPUT: &str = "stdout";
/// Rotation size limit in megabytes.
pub const DEFAULT_MAX_SIZE: u32 = 100;
pub const DEFAULT_MAX_BACKUPS: u32 = 10;
/// Rotated file retention in days.
pub const DEFAULT_MAX_AGE: u32 = 30;
pub const DEFAULT_EXPIRE_TIME: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_ISSUER: &str = "movieinfo";

/// Root configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    /// Cache connection settings
    pub redis: RedisConfig,
    pub log: LogConfig,
    /// Token issuance settings
    pub jwt: JwtConfig,
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    /// One of `development`, `testing`, `production`
    pub environment: String,
    pub debug: bool,
    /// Listen port (1-65535)
    pub port: u32,
}

/// Datastore settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub driver: String,
    pub host: String,
    pub port: u32,
    pub username: String,
    pub password: String,
    pub database: String,
    pub charset: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
}

/// Cache settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u32,
    pub password: String,
    /// Logical database index
    pub database: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `debug`, `info`, `warn` or `error`
    pub level: String,
    /// `json` or `text`
    pub format: String,
    /// `stdout`, `stderr` or `file`
    pub output: String,
    pub file: FileConfig,
}

/// Rotating file sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub path: String,
    /// Size limit in megabytes before rotation
    pub max_size: u32,
    /// Rotated files to keep (0 keeps all)
    pub max_backups: u32,
    /// Days to keep rotated files
    pub max_age: u32,
    /// Gzip rotated files
    pub compress: bool,
}

/// Token issuance settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(deserialize_with = "duration::deserialize")]
    pub expire_time: Duration,
    pub issuer: String,
}

/// Deployment environment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Development, Self::Testing, Self::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| format!("unknown environment '{s}'"))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Config {
    /// Fill zero-valued fields with their defaults. Populated fields are left untouched.
    pub fn apply_defaults(&mut self) {
        self.app.apply_defaults();
        self.database.apply_defaults();
        self.log.apply_defaults();
        self.jwt.apply_defaults();
    }

    /// Validate configuration and return every violation found.
    pub fn validate(&self) -> crate::Result<()> {
        super::validation::validate(self)
    }
}

impl AppConfig {
    fn apply_defaults(&mut self) {
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
    }

    /// Parsed environment tag, `None` when it is not one of the known values.
    pub fn environment(&self) -> Option<Environment> {
        self.environment.parse().ok()
    }
}

impl DatabaseConfig {
    fn apply_defaults(&mut self) {
        fill_str(&mut self.charset, DEFAULT_CHARSET);
        fill_u32(&mut self.max_open_conns, DEFAULT_MAX_OPEN_CONNS);
        fill_u32(&mut self.max_idle_conns, DEFAULT_MAX_IDLE_CONNS);
    }

    /// Connection string in `user:password@tcp(host:port)/database?charset=..` form.
    pub fn dsn(&self) -> String {
        format!(
            "{}:{}@tcp({}:{})/{}?charset={}",
            self.username, self.password, self.host, self.port, self.database, self.charset
        )
    }
}

impl RedisConfig {
    /// `host:port` address of the cache.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl LogConfig {
    fn apply_defaults(&mut self) {
        fill_str(&mut self.level, DEFAULT_LOG_LEVEL);
        fill_str(&mut self.format, DEFAULT_LOG_FORMAT);
        fill_str(&mut self.output, DEFAULT_LOG_OUTPUT);
        fill_u32(&mut self.file.max_size, DEFAULT_MAX_SIZE);
        fill_u32(&mut self.file.max_backups, DEFAULT_MAX_BACKUPS);
        fill_u32(&mut self.file.max_age, DEFAULT_MAX_AGE);
    }
}

impl JwtConfig {
    fn apply_defaults(&mut self) {
        if self.expire_time.is_zero() {
            self.expire_time = DEFAULT_EXPIRE_TIME;
        }
        fill_str(&mut self.issuer, DEFAULT_ISSUER);
    }
}

fn fill_str(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

fn fill_u32(field: &mut u32, default: u32) {
    if *field == 0 {
        *field = default;
    }
}

/// Duration accepted as a human string (`"24h"`, `"1h 30m"`) or whole seconds.
///
/// Bare integers are read as seconds so numeric TOML/JSON values load without a unit.
mod duration {
    use super::*;
    use serde::de::{self, Visitor};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration such as \"24h\" or a number of seconds")
        }

        fn visit_u64<E: de::Error>(self, secs: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(secs))
        }

        fn visit_i64<E: de::Error>(self, secs: i64) -> Result<Duration, E> {
            u64::try_from(secs)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("negative duration: {secs}")))
        }

        fn visit_str<E: de::Error>(self, s: &str) -> Result<Duration, E> {
            let s = s.trim();
            if s.is_empty() {
                return Ok(Duration::ZERO);
            }
            humantime::parse_duration(s).map_err(E::custom)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Duration, E> {
            Ok(Duration::ZERO)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_zero_values() {
        let mut config = Config::default();
        config.apply_defaults();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.database.charset, "utf8mb4");
        assert_eq!(config.database.max_open_conns, 100);
        assert_eq!(config.database.max_idle_conns, 10);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, "json");
        assert_eq!(config.log.output, "stdout");
        assert_eq!(config.log.file.max_size, 100);
        assert_eq!(config.log.file.max_backups, 10);
        assert_eq!(config.log.file.max_age, 30);
        assert_eq!(config.jwt.expire_time, Duration::from_secs(86_400));
        assert_eq!(config.jwt.issuer, "movieinfo");
    }

    #[test]
    fn test_defaults_keep_populated_values() {
        let mut config = Config::default();
        config.app.port = 9000;
        config.log.level = "error".to_string();
        config.database.charset = "latin1".to_string();
        config.jwt.expire_time = Duration::from_secs(60);

        config.apply_defaults();

        assert_eq!(config.app.port, 9000);
        assert_eq!(config.log.level, "error");
        assert_eq!(config.database.charset, "latin1");
        assert_eq!(config.jwt.expire_time, Duration::from_secs(60));
    }

    #[test]
    fn test_expire_time_accepts_strings_and_seconds() {
        let jwt: JwtConfig = serde_json::from_str(r#"{"expire_time":"2h"}"#).unwrap();
        assert_eq!(jwt.expire_time, Duration::from_secs(7200));

        let jwt: JwtConfig = serde_json::from_str(r#"{"expire_time":"1h 30m"}"#).unwrap();
        assert_eq!(jwt.expire_time, Duration::from_secs(5400));

        let jwt: JwtConfig = serde_json::from_str(r#"{"expire_time":3600}"#).unwrap();
        assert_eq!(jwt.expire_time, Duration::from_secs(3600));

        assert!(serde_json::from_str::<JwtConfig>(r#"{"expire_time":"soon"}"#).is_err());
    }

    #[test]
    fn test_dsn_and_cache_address() {
        let database = DatabaseConfig {
            host: "db.local".to_string(),
            port: 3306,
            username: "movie".to_string(),
            password: "secret".to_string(),
            database: "movieinfo".to_string(),
            charset: "utf8mb4".to_string(),
            ..Default::default()
        };
        assert_eq!(
            database.dsn(),
            "movie:secret@tcp(db.local:3306)/movieinfo?charset=utf8mb4"
        );

        let redis = RedisConfig {
            host: "cache.local".to_string(),
            port: 6379,
            ..Default::default()
        };
        assert_eq!(redis.address(), "cache.local:6379");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("testing".parse::<Environment>(), Ok(Environment::Testing));
        assert!("attestation".parse::<Environment>().is_err());
        assert!("Production".parse::<Environment>().is_err());
    }
}
