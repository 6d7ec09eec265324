//! Configuration validation.
//!
//! Static checks run first and report every violated field. Business rules only
//! run once the static pass is clean.

use super::types::{Config, Environment};
use crate::error::{Result, Violations};

pub const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
pub const LOG_FORMATS: [&str; 2] = ["json", "text"];
pub const LOG_OUTPUTS: [&str; 3] = ["stdout", "stderr", "file"];

/// Validate configuration.
pub fn validate(config: &Config) -> Result<()> {
    let violations = check_fields(config);
    if !violations.is_empty() {
        return violations.into_result();
    }
    check_business_rules(config).into_result()
}

/// Type, range and enum checks for every field.
pub fn check_fields(config: &Config) -> Violations {
    let mut v = Violations::new();

    // Application
    let app = &config.app;
    required(&mut v, "app.name", &app.name);
    required(&mut v, "app.version", &app.version);
    if app.environment.is_empty() {
        v.push("app.environment", "is required");
    } else if app.environment().is_none() {
        let allowed: Vec<&str> = Environment::ALL.iter().map(Environment::as_str).collect();
        one_of(&mut v, "app.environment", &app.environment, &allowed);
    }
    port(&mut v, "app.port", app.port);

    // Datastore
    let db = &config.database;
    required(&mut v, "database.driver", &db.driver);
    required(&mut v, "database.host", &db.host);
    port(&mut v, "database.port", db.port);
    required(&mut v, "database.username", &db.username);
    required(&mut v, "database.database", &db.database);
    at_least_one(&mut v, "database.max_open_conns", db.max_open_conns);
    at_least_one(&mut v, "database.max_idle_conns", db.max_idle_conns);

    // Cache
    required(&mut v, "redis.host", &config.redis.host);
    port(&mut v, "redis.port", config.redis.port);

    // Logging
    let log = &config.log;
    one_of(&mut v, "log.level", &log.level, &LOG_LEVELS);
    one_of(&mut v, "log.format", &log.format, &LOG_FORMATS);
    one_of(&mut v, "log.output", &log.output, &LOG_OUTPUTS);
    required(&mut v, "log.file.path", &log.file.path);
    at_least_one(&mut v, "log.file.max_size", log.file.max_size);
    at_least_one(&mut v, "log.file.max_age", log.file.max_age);

    // Token
    if config.jwt.expire_time.is_zero() {
        v.push("jwt.expire_time", "is required");
    }
    required(&mut v, "jwt.issuer", &config.jwt.issuer);

    v
}

/// Cross-field rules that depend on the deployment environment.
pub fn check_business_rules(config: &Config) -> Violations {
    let mut v = Violations::new();

    // Any environment tag containing "test" is exempt, e.g. "attestation".
    if config.database.password.is_empty() && !config.app.environment.contains("test") {
        v.push(
            "database.password",
            "is required for non-test environments",
        );
    }

    if config.jwt.secret.is_empty() {
        v.push("jwt.secret", "is required");
    }

    v
}

fn required(v: &mut Violations, field: &str, value: &str) {
    if value.is_empty() {
        v.push(field, "is required");
    }
}

fn port(v: &mut Violations, field: &str, value: u32) {
    if !(1..=65535).contains(&value) {
        v.push(field, format!("must be between 1 and 65535, got {value}"));
    }
}

fn at_least_one(v: &mut Violations, field: &str, value: u32) {
    if value < 1 {
        v.push(field, "must be at least 1");
    }
}

fn one_of(v: &mut Violations, field: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
        v.push(
            field,
            format!("'{}' must be one of: {}", value, allowed.join(", ")),
        );
    }
}
