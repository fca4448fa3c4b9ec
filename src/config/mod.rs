//! Configuration for the microflow host
//!
//! Settings are stored as TOML. The file is looked up in this order:
//!
//! 1. an explicit path (`--config` on the command line)
//! 2. the path in the `MICROFLOW_CONFIG` environment variable
//! 3. `<config_dir>/microflow/config.toml`:
//!    - **Linux**: `~/.config/microflow/config.toml`
//!    - **macOS**: `~/Library/Application Support/microflow/config.toml`
//!    - **Windows**: `%APPDATA%\microflow\config.toml`
//!
//! A missing file means defaults.
//!
//! # Example
//!
//! ```toml
//! [logging]
//! filter = "microflow=debug"
//! log_to_file = true
//!
//! [registry]
//! override_policy = "keep-existing"
//! ```

use crate::error::{EngineError, Result, ResultExt};
use crate::filter::OverridePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config and data directories
pub const APP_ID: &str = "microflow";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the config path
pub const CONFIG_ENV_VAR: &str = "MICROFLOW_CONFIG";

/// Log filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "microflow=info";

// ==================== Paths ====================

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Resolve the config file: explicit path, then the environment, then the default location
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => default_config_path(),
    }
}

// ==================== Sections ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` takes precedence
    pub filter: String,

    /// Also write a daily rolling log file
    pub log_to_file: bool,

    /// Directory for log files; defaults to `<data_dir>/microflow/logs`
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_to_file: false,
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// What happens when two filters register under the same name
    pub override_policy: OverridePolicy,
}

// ==================== Engine Config ====================

/// Settings for the host binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub registry: RegistryConfig,
}

impl EngineConfig {
    /// Load a config file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        toml::from_str(&content)
            .map_err(EngineError::from)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load the resolved config, returning defaults on any error
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let Some(path) = resolve_config_path(explicit) else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EngineError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    /// Directory for rolling log files
    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .log_dir
            .clone()
            .or_else(|| dirs_next::data_dir().map(|p| p.join(APP_ID).join("logs")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(!config.logging.log_to_file);
        assert_eq!(config.registry.override_policy, OverridePolicy::Replace);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [registry]
            override_policy = "keep-existing"
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.override_policy, OverridePolicy::KeepExisting);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.logging.filter = "microflow=trace".to_string();
        config.logging.log_dir = Some(dir.path().join("logs"));
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.log_dir(), Some(dir.path().join("logs")));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let loaded = EngineConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[registry]\noverride_policy = \"sometimes\"\n").unwrap();

        assert!(EngineConfig::load(&path).is_err());
        assert_eq!(EngineConfig::load_or_default(Some(&path)), EngineConfig::default());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/explicit.toml");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
