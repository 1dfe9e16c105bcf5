//! Configuration type definitions.

use super::enums::{ColorSpec, StorageCompression, StorageMode};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Drawing-related settings.
///
/// Controls the pen used when no pen configuration has been saved yet.
/// Users change the pen at runtime; those changes are persisted separately.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Default pen color - either a named color (red, green, blue, yellow, orange, pink, white, black)
    /// or an RGB array like `[255, 0, 0]` for red
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Default pen width in pixels (valid range: 1.0 - 50.0)
    #[serde(default = "default_width")]
    pub default_width: f64,

    /// Highest pen width kept while the eraser is active (valid range: 1.0 - 50.0)
    #[serde(default = "default_max_eraser_width")]
    pub max_eraser_width: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_width: default_width(),
            max_eraser_width: default_max_eraser_width(),
        }
    }
}

/// Board appearance.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BoardConfig {
    /// Score sheet background; eraser strokes paint in this color
    #[serde(default = "default_background_color")]
    pub background_color: ColorSpec,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
        }
    }
}

/// Undo history and in-memory limits.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Committed strokes kept per board; the oldest are dropped first (minimum 1)
    #[serde(default = "default_max_strokes")]
    pub max_strokes: usize,

    /// Undone strokes available for redo (minimum 1)
    #[serde(default = "default_max_undo")]
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_strokes: default_max_strokes(),
            max_undo: default_max_undo(),
        }
    }
}

/// Board persistence settings.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StorageConfig {
    /// Where board files live: auto (data dir), config, or custom
    #[serde(default)]
    pub storage: StorageMode,

    /// Directory used when `storage = "custom"` (`~/` is expanded)
    #[serde(default)]
    pub custom_directory: Option<String>,

    /// Idle time before a changed board is written, in milliseconds (0 - 60000)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Newest strokes written per board
    #[serde(default = "default_max_persisted")]
    pub max_persisted: usize,

    /// Largest board file read or written, in MiB
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Compression: off, on, or auto
    #[serde(default)]
    pub compress: StorageCompression,

    /// Payload size in KiB from which `compress = "auto"` gzips
    #[serde(default = "default_auto_compress_threshold_kb")]
    pub auto_compress_threshold_kb: u64,

    /// Number of backups kept (0 or 1)
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage: StorageMode::default(),
            custom_directory: None,
            debounce_ms: default_debounce_ms(),
            max_persisted: default_max_persisted(),
            max_file_size_mb: default_max_file_size_mb(),
            compress: StorageCompression::default(),
            auto_compress_threshold_kb: default_auto_compress_threshold_kb(),
            backup_retention: default_backup_retention(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_width() -> f64 {
    2.0
}

fn default_max_eraser_width() -> f64 {
    20.0
}

fn default_background_color() -> ColorSpec {
    ColorSpec::Name("white".to_string())
}

fn default_max_strokes() -> usize {
    500
}

fn default_max_undo() -> usize {
    20
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_max_persisted() -> usize {
    1000
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_auto_compress_threshold_kb() -> u64 {
    100
}

fn default_backup_retention() -> usize {
    1
}
