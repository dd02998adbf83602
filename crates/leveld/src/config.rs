//! Configuration management for leveld.
//!
//! Loads settings from `$XDG_CONFIG_HOME/vault-level/config.toml` (or the
//! `--config` path) and falls back to defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Config directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "vault-level";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// State directory created inside the vault
pub const STATE_DIR_NAME: &str = ".vault-level";

/// State file name inside the state directory
pub const STATE_FILE_NAME: &str = "state.json";

/// Status panel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Color the badge title
    #[serde(default = "default_color")]
    pub color: bool,

    /// Progress bar width in characters (excluding brackets)
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,
}

fn default_color() -> bool {
    true
}

fn default_bar_width() -> usize {
    24
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            bar_width: default_bar_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Vault root directory
    #[serde(default = "default_vault_path")]
    pub vault_path: PathBuf,

    /// State file; defaults to `<vault>/.vault-level/state.json`
    #[serde(default)]
    pub state_path: Option<PathBuf>,

    /// Tracked document extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Quiet period before recomputing after changes
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_vault_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    level_common::scheduler::DEFAULT_EXTENSION.to_string()
}

fn default_debounce_ms() -> u64 {
    level_common::scheduler::DEFAULT_QUIET_PERIOD.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            state_path: None,
            extension: default_extension(),
            debounce_ms: default_debounce_ms(),
            log_level: default_log_level(),
            display: DisplayConfig::default(),
        }
    }
}

impl LevelConfig {
    /// `$XDG_CONFIG_HOME/vault-level/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path` (or the default location). Never fails.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                info!("No config directory, using defaults");
                return Self::default();
            }
        };

        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!("Invalid config at {}, using defaults: {}", path.display(), e);
            Self::default()
        })
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: LevelConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override the vault root (from the command line)
    pub fn with_vault(mut self, vault: Option<PathBuf>) -> Self {
        if let Some(vault) = vault {
            self.vault_path = vault;
        }
        self
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_path.clone().unwrap_or_else(|| {
            self.vault_path.join(STATE_DIR_NAME).join(STATE_FILE_NAME)
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
