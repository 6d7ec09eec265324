//! Process-wide logger behavior.
//!
//! The global logger is shared by every test in this binary, so the whole
//! lifecycle runs as one ordered test.

use std::fs;

use movieinfo::config::{ConfigManager, LogConfig};
use movieinfo::{errorf, infof, logger};
use serde_json::Value;
use tempfile::TempDir;

const CONFIG_YAML: &str = r#"
app:
  name: movieinfo
  version: "1.0.0"
  environment: testing
database:
  driver: mysql
  host: localhost
  port: 3306
  username: root
  database: movieinfo
redis:
  host: localhost
  port: 6379
log:
  file:
    path: logs/app.log
jwt:
  secret: secret
"#;

fn records(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_global_logger_lifecycle() {
    // Before initialization every call is a silent no-op.
    assert!(!logger::is_initialized());
    logger::info("dropped");
    logger::with_field("k", "v").error("dropped");
    infof!("dropped {}", 1);
    assert!(logger::get().is_none());

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("nested").join("app.log");
    let mut config = LogConfig::default();
    config.level = "info".to_string();
    config.format = "json".to_string();
    config.output = "file".to_string();
    config.file.path = log_path.display().to_string();
    config.file.max_size = 1;
    config.file.max_backups = 2;

    logger::init(&config).unwrap();
    assert!(logger::is_initialized());
    assert!(log_path.exists(), "init creates the log file");

    logger::debug("below level");
    logger::info("started");
    let request = logger::with_field("request_id", "req-1");
    request.with_field("status", 200).warn("slow response");
    request.info("request finished");
    logger::with_error("connection refused").error("cache unavailable");
    errorf!("retry {} of {}", 2, 3);

    let lines = records(&log_path);
    let messages: Vec<&str> = lines.iter().map(|r| r["msg"].as_str().unwrap()).collect();
    assert_eq!(
        messages,
        [
            "started",
            "slow response",
            "request finished",
            "cache unavailable",
            "retry 2 of 3"
        ]
    );

    assert_eq!(lines[1]["level"], "WARN");
    assert_eq!(lines[1]["request_id"], "req-1");
    assert_eq!(lines[1]["status"], 200);
    assert_eq!(lines[2]["request_id"], "req-1");
    assert!(lines[2].get("status").is_none(), "child fields stay on the child");
    assert_eq!(lines[3]["error"], "connection refused");
    assert!(lines[4].get("request_id").is_none());

    // The crate's own diagnostics land in the same file with the same shape.
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, CONFIG_YAML).unwrap();
    let manager = ConfigManager::with_env_lookup(&config_path, |_| None).unwrap();
    manager.reload().unwrap();

    let lines = records(&log_path);
    let reloaded = lines.last().unwrap();
    assert_eq!(reloaded["msg"], "Config reloaded successfully");
    assert_eq!(reloaded["level"], "INFO");
    assert_eq!(reloaded["target"], "movieinfo::config::manager");
    assert_eq!(reloaded["path"], config_path.display().to_string());
    assert!(reloaded["time"].is_string());
    assert!(
        lines.iter().all(|r| r["msg"] != "Configuration loaded"),
        "debug diagnostics are below the configured level"
    );

    // Re-initializing replaces the logger.
    config.level = "error".to_string();
    logger::init(&config).unwrap();
    logger::warn("filtered after re-init");
    fs::write(&config_path, "app: [unterminated\n").unwrap();
    assert!(manager.reload().is_err());
    logger::error("kept after re-init");

    let lines = records(&log_path);
    let last = lines.last().unwrap();
    assert_eq!(last["msg"], "kept after re-init");
    assert!(lines.iter().all(|r| r["msg"] != "filtered after re-init"));
    assert!(
        lines.iter().all(|r| r["level"] != "WARN" || r["msg"] == "slow response"),
        "diagnostics follow the new level"
    );
}
