//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config ($XDG_CONFIG_HOME/batis/config.yaml)
//! 3. Environment variables (BATIS_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use crate::utils::get_home_dir;
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// User config file name inside the config directory
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Directory holding the user's config file
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the standard config directory
    pub fn new() -> Result<Self> {
        let config_dir = Self::default_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// `$XDG_CONFIG_HOME/batis`, falling back to `~/.config/batis`
    fn default_config_dir() -> Result<PathBuf> {
        match env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir).join("batis")),
            _ => {
                let home = get_home_dir()
                    .map_err(|_| Error::invalid_config("Could not determine home directory"))?;
                Ok(home.join(".config").join("batis"))
            }
        }
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        // Start with embedded defaults
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let user_config_path = self.config_dir.join(CONFIG_FILENAME);
        if user_config_path.exists() {
            debug!("Loading user config from {:?}", user_config_path);
            config = self.load_yaml_file::<RuntimeConfig>(&user_config_path)?;
        }

        config = Self::apply_env_overrides(config)?;

        if config.package_managers.is_empty() {
            return Err(Error::invalid_config(
                "package-managers must list at least one package manager",
            ));
        }

        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {:?}: {}", path, e)))
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("BATIS_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("BATIS_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("BATIS_DOWNLOAD_TIMEOUT_SECS") {
            config.network.download_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("BATIS_DOWNLOAD_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("BATIS_USER_AGENT") {
            config.network.user_agent = val;
        }

        if let Ok(val) = env::var("BATIS_SUDO_COMMAND") {
            config.privilege.sudo_command = val;
        }

        if let Ok(val) = env::var("BATIS_BACKEND_SUDO_COMMAND") {
            config.privilege.backend_sudo_command = val;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}
