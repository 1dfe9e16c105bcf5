use super::types::RecordId;
use crate::config::{StorageCompression, StorageConfig, StorageMode};
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES: u64 = 100 * 1024; // 100 KiB
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_PERSISTED: usize = 1000;

/// Compression preference for record files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Always write plain JSON.
    Off,
    /// Always write gzip-compressed JSON.
    On,
    /// Write gzip when payload exceeds the configured threshold.
    Auto,
}

/// Runtime options derived from configuration for board persistence.
#[derive(Debug, Clone)]
pub struct StorageOptions {
    pub base_dir: PathBuf,
    pub debounce: Duration,
    pub max_persisted: usize,
    pub max_file_size_bytes: u64,
    pub compression: CompressionMode,
    pub auto_compress_threshold_bytes: u64,
    pub backup_retention: usize,
}

impl StorageOptions {
    /// Creates a basic options struct with sensible defaults. Intended mainly for tests.
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            debounce: DEFAULT_DEBOUNCE,
            max_persisted: DEFAULT_MAX_PERSISTED,
            max_file_size_bytes: 10 * 1024 * 1024,
            compression: CompressionMode::Auto,
            auto_compress_threshold_bytes: DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES,
            backup_retention: 1,
        }
    }

    pub fn record_file_path(&self, record: &RecordId) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", Self::record_file_stem(record)))
    }

    pub fn backup_file_path(&self, record: &RecordId) -> PathBuf {
        self.base_dir
            .join(format!("{}.json.bak", Self::record_file_stem(record)))
    }

    pub fn lock_file_path(&self, record: &RecordId) -> PathBuf {
        self.base_dir
            .join(format!("{}.lock", Self::record_file_stem(record)))
    }

    fn record_file_stem(record: &RecordId) -> String {
        format!("board-{}", record.file_stem())
    }
}

/// Build runtime storage options from configuration values.
pub fn options_from_config(storage_cfg: &StorageConfig, config_dir: &Path) -> Result<StorageOptions> {
    let base_dir = match storage_cfg.storage {
        StorageMode::Auto => {
            let root = dirs::data_dir().unwrap_or_else(|| config_dir.to_path_buf());
            root.join("inkboard")
        }
        StorageMode::Config => config_dir.to_path_buf(),
        StorageMode::Custom => {
            let raw = storage_cfg.custom_directory.as_ref().ok_or_else(|| {
                anyhow!("storage.custom_directory must be set when storage = \"custom\"")
            })?;
            let expanded = expand_tilde(raw);
            if expanded.as_os_str().is_empty() {
                return Err(anyhow!("storage.custom_directory resolved to an empty path"));
            }
            expanded
        }
    };

    let mut options = StorageOptions::new(base_dir);
    options.debounce = Duration::from_millis(storage_cfg.debounce_ms);
    options.max_persisted = storage_cfg.max_persisted.max(1);
    options.max_file_size_bytes = storage_cfg
        .max_file_size_mb
        .saturating_mul(1024 * 1024)
        .max(1);
    options.auto_compress_threshold_bytes = storage_cfg
        .auto_compress_threshold_kb
        .saturating_mul(1024)
        .max(1);
    options.compression = match storage_cfg.compress {
        StorageCompression::Auto => CompressionMode::Auto,
        StorageCompression::On => CompressionMode::On,
        StorageCompression::Off => CompressionMode::Off,
    };
    options.backup_retention = storage_cfg.backup_retention;

    Ok(options)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_storage_requires_directory() {
        let cfg = StorageConfig {
            storage: StorageMode::Custom,
            custom_directory: None,
            ..StorageConfig::default()
        };
        let err = options_from_config(&cfg, Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("custom_directory"));
    }

    #[test]
    fn config_mode_uses_config_dir_and_limits() {
        let cfg = StorageConfig {
            storage: StorageMode::Config,
            debounce_ms: 250,
            max_persisted: 0,
            compress: StorageCompression::On,
            auto_compress_threshold_kb: 4,
            ..StorageConfig::default()
        };
        let options = options_from_config(&cfg, Path::new("/cfg/inkboard")).unwrap();
        assert_eq!(options.base_dir, PathBuf::from("/cfg/inkboard"));
        assert_eq!(options.debounce, Duration::from_millis(250));
        assert_eq!(options.max_persisted, 1);
        assert_eq!(options.compression, CompressionMode::On);
        assert_eq!(options.auto_compress_threshold_bytes, 4096);
    }

    #[test]
    fn file_names_use_escaped_record_id() {
        let options = StorageOptions::new(PathBuf::from("/data"));
        let record = RecordId::new("meet 7/beam");
        assert_eq!(
            options.record_file_path(&record),
            PathBuf::from("/data/board-meet_207_2fbeam.json")
        );
        assert_eq!(
            options.backup_file_path(&record),
            PathBuf::from("/data/board-meet_207_2fbeam.json.bak")
        );
        assert_eq!(
            options.lock_file_path(&record),
            PathBuf::from("/data/board-meet_207_2fbeam.lock")
        );
    }
}
