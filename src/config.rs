use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CleanError, Result};

pub const CONFIG_ENV: &str = "SB_CLEANER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub salary: SalaryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_dir: PathBuf,
    pub cleaned_dir: PathBuf,
    pub removed_dir: PathBuf,
    pub database: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw_data"),
            cleaned_dir: PathBuf::from("cleaned_data"),
            removed_dir: PathBuf::from("removed_data"),
            database: PathBuf::from("db/base_running.db"),
        }
    }
}

impl PathsConfig {
    /// All paths under one root directory, as used by tests and ad hoc runs.
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            raw_dir: root.join(defaults.raw_dir),
            cleaned_dir: root.join(defaults.cleaned_dir),
            removed_dir: root.join(defaults.removed_dir),
            database: root.join(defaults.database),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
    /// Write the rolling file as JSON lines instead of plain text
    pub json_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_prefix: "sb_cleaner.log".to_string(),
            json_file: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalaryConfig {
    pub fill_scope: FillScope,
}

/// How far back an unknown salary may look for a known one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillScope {
    /// Nearest preceding known value anywhere in source order
    #[default]
    Sequence,
    /// Nearest preceding known value within the same run of Player ID rows
    Player,
}

impl CleanerConfig {
    /// Load from `path`, or from `SB_CLEANER_CONFIG`, or from `config.toml`.
    /// A missing file yields the defaults; a malformed one is an error.
    /// Path overrides from the environment (and `.env`) are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|e| {
                CleanError::Config(format!(
                    "Failed to read config file '{}': {}",
                    config_path.display(),
                    e
                ))
            })?;
            let config: CleanerConfig = toml::from_str(&content)?;
            info!("Loaded configuration from {}", config_path.display());
            config
        } else if path.is_some() {
            return Err(CleanError::Config(format!(
                "Config file '{}' does not exist",
                config_path.display()
            )));
        } else {
            info!("No config file at {}, using defaults", config_path.display());
            CleanerConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut PathBuf); 4] = [
            ("SB_CLEANER_RAW_DIR", &mut self.paths.raw_dir),
            ("SB_CLEANER_CLEANED_DIR", &mut self.paths.cleaned_dir),
            ("SB_CLEANER_REMOVED_DIR", &mut self.paths.removed_dir),
            ("SB_CLEANER_DATABASE", &mut self.paths.database),
        ];
        for (key, slot) in overrides {
            if let Ok(value) = std::env::var(key) {
                if !value.trim().is_empty() {
                    *slot = PathBuf::from(value);
                }
            }
        }
    }
}
