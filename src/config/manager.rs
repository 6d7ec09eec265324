//! Hot-reloadable configuration manager.

use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::loader::ConfigLoader;
use super::types::{Config, Environment, LogConfig};
use crate::error::Result;

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Owns the current configuration snapshot and swaps it atomically on reload.
///
/// Readers never block each other. A reload parses and validates without
/// touching the published snapshot, then publishes the new one in a single
/// pointer swap.
pub struct ConfigManager {
    path: PathBuf,
    current: ArcSwap<Config>,
    lookup: Arc<EnvLookup>,
}

impl ConfigManager {
    /// Load the configuration at `path` using the process environment for overrides.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_env_lookup(path, |name| std::env::var(name).ok())
    }

    /// Load the configuration at `path`, resolving override variables through `lookup`
    /// on this and every later reload.
    pub fn with_env_lookup<F>(path: impl Into<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let path = path.into();
        let lookup: Arc<EnvLookup> = Arc::new(lookup);
        let config = ConfigLoader::load_with_env(&path, |name| lookup(name))?;

        Ok(Self {
            path,
            current: ArcSwap::from_pointee(config),
            lookup,
        })
    }

    /// Source file of every load and reload.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current snapshot. It is not updated by later reloads.
    pub fn get(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Reload from the configured path.
    ///
    /// On failure the previous snapshot stays current and the error is returned.
    pub fn reload(&self) -> Result<()> {
        match ConfigLoader::load_with_env(&self.path, |name| (self.lookup)(name)) {
            Ok(config) => {
                self.current.store(Arc::new(config));
                info!(path = %self.path.display(), "Config reloaded successfully");
                Ok(())
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Config reload failed, keeping previous configuration"
                );
                Err(e)
            }
        }
    }

    /// Datastore connection string of the current snapshot.
    pub fn dsn(&self) -> String {
        self.current.load().database.dsn()
    }

    /// Cache `host:port` of the current snapshot.
    pub fn cache_address(&self) -> String {
        self.current.load().redis.address()
    }

    pub fn environment(&self) -> Option<Environment> {
        self.current.load().app.environment()
    }

    pub fn is_production(&self) -> bool {
        self.environment() == Some(Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        self.environment() == Some(Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        self.environment() == Some(Environment::Testing)
    }

    /// Logger settings of the current snapshot.
    pub fn log_config(&self) -> LogConfig {
        self.current.load().log.clone()
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
