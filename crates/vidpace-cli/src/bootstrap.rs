//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together
//! for the CLI:
//! - Settings (defaults, optional JSON overrides, validation)
//! - The `SQLite` speed store (via vidpace-store)
//! - Typed speed preferences over that store (via vidpace-core)

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;
use vidpace_core::{
    CoreError, KeyValueStore, Settings, SettingsUpdate, SpeedPreferences, validate_settings,
};
use vidpace_store::open_store;

use crate::error::CliError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "VIDPACE_DATA_DIR";

const DB_FILE_NAME: &str = "speeds.db";

/// Default database location.
///
/// Resolution order:
/// 1. `VIDPACE_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/vidpace`)
pub fn default_db_path() -> Result<PathBuf, CliError> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir).join(DB_FILE_NAME));
    }
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| CliError::Config("No data directory on this platform".to_string()))?;
    Ok(data_dir.join("vidpace").join(DB_FILE_NAME))
}

/// Read a JSON settings override file.
pub fn load_settings_update(path: &Path) -> Result<SettingsUpdate, CliError> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))
}

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Database file.
    pub db_path: PathBuf,
    /// Validated settings.
    pub settings: Settings,
}

impl CliConfig {
    /// Default database location and default settings.
    pub fn with_defaults() -> Result<Self, CliError> {
        Self::resolve(None, None)
    }

    /// Apply the global `--db` and `--config` options.
    pub fn resolve(db: Option<PathBuf>, config: Option<&Path>) -> Result<Self, CliError> {
        let db_path = match db {
            Some(path) => path,
            None => default_db_path()?,
        };

        let mut settings = Settings::with_defaults();
        if let Some(path) = config {
            let update = load_settings_update(path)?;
            settings.merge(&update);
            debug!(path = %path.display(), "Applied settings overrides");
        }
        validate_settings(&settings).map_err(CoreError::from)?;

        Ok(Self { db_path, settings })
    }
}

/// Composed context handed to command handlers.
pub struct CliContext {
    store: Arc<dyn KeyValueStore>,
    prefs: SpeedPreferences,
    settings: Settings,
}

impl CliContext {
    /// The shared store.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Typed access to the speed map.
    pub const fn prefs(&self) -> &SpeedPreferences {
        &self.prefs
    }

    /// Validated settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Bootstrap the CLI: open the store and compose the context.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let store = open_store(&config.db_path).await?;
    debug!(db = %config.db_path.display(), "Opened speed store");
    Ok(bootstrap_with(Arc::new(store), config.settings))
}

/// Compose a context over an existing store (for testing).
pub fn bootstrap_with(store: Arc<dyn KeyValueStore>, settings: Settings) -> CliContext {
    CliContext {
        prefs: SpeedPreferences::new(store.clone()),
        store,
        settings,
    }
}
