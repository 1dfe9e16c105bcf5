//! Configuration file support for inkboard.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/inkboard/config.toml`. Settings include pen defaults, the board
//! background, history limits, and where and how boards are stored.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{ColorSpec, StorageCompression, StorageMode};
pub use types::{BoardConfig, DrawingConfig, HistoryConfig, StorageConfig};

use crate::pen::PenConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "blue"
/// default_width = 3.0
/// max_eraser_width = 20.0
///
/// [board]
/// background_color = "white"
///
/// [history]
/// max_strokes = 500
/// max_undo = 20
///
/// [storage]
/// storage = "auto"
/// debounce_ms = 1000
/// compress = "auto"
/// ```
#[derive(Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Pen defaults (color, width, eraser ceiling)
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Board appearance
    #[serde(default)]
    pub board: BoardConfig,

    /// Undo history and stroke limits
    #[serde(default)]
    pub history: HistoryConfig,

    /// Board persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `default_width`: 1.0 - 50.0
    /// - `max_eraser_width`: 1.0 - 50.0
    /// - `max_strokes`, `max_undo`, `max_persisted`: at least 1
    /// - `debounce_ms`: 0 - 60000
    /// - `backup_retention`: 0 - 1
    pub fn validate_and_clamp(&mut self) {
        // Width: 1.0 - 50.0
        if !(1.0..=50.0).contains(&self.drawing.default_width) {
            log::warn!(
                "Invalid default_width {:.1}, clamping to 1.0-50.0 range",
                self.drawing.default_width
            );
            self.drawing.default_width = if self.drawing.default_width.is_nan() {
                2.0
            } else {
                self.drawing.default_width.clamp(1.0, 50.0)
            };
        }

        if !(1.0..=50.0).contains(&self.drawing.max_eraser_width) {
            log::warn!(
                "Invalid max_eraser_width {:.1}, clamping to 1.0-50.0 range",
                self.drawing.max_eraser_width
            );
            self.drawing.max_eraser_width = if self.drawing.max_eraser_width.is_nan() {
                20.0
            } else {
                self.drawing.max_eraser_width.clamp(1.0, 50.0)
            };
        }

        if self.history.max_strokes == 0 {
            log::warn!("Invalid max_strokes 0, using 1");
            self.history.max_strokes = 1;
        }

        if self.history.max_undo == 0 {
            log::warn!("Invalid max_undo 0, using 1");
            self.history.max_undo = 1;
        }

        if self.storage.max_persisted == 0 {
            log::warn!("Invalid max_persisted 0, using 1");
            self.storage.max_persisted = 1;
        }

        if self.storage.debounce_ms > 60_000 {
            log::warn!(
                "Invalid debounce_ms {}, clamping to 0-60000 range",
                self.storage.debounce_ms
            );
            self.storage.debounce_ms = 60_000;
        }

        if self.storage.backup_retention > 1 {
            log::warn!(
                "backup_retention {} not supported, keeping a single backup",
                self.storage.backup_retention
            );
            self.storage.backup_retention = 1;
        }
    }

    /// Pen used until the user changes it.
    pub fn default_pen(&self) -> PenConfig {
        PenConfig {
            color: self.drawing.default_color.to_color(),
            stroke_width: self.drawing.default_width,
            ..PenConfig::default()
        }
    }

    /// Returns the directory holding `config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not find config directory")?
            .join("inkboard"))
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/inkboard/config.toml`.
    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from an explicit path, or returns defaults if it does not exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to `path`, creating the parent directory.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory cannot be created
    /// - The config cannot be serialized to TOML
    /// - The file cannot be written
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// JSON schema of the config file, for editor tooling.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
