use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use log::debug;

use super::PenConfig;
use crate::storage::StorageError;

/// Global location for the persisted pen configuration.
///
/// The pen is shared by every board, so it is stored independently of any record.
pub trait PenStore: Send + Sync {
    fn load(&self) -> Result<Option<PenConfig>, StorageError>;
    fn save(&self, pen: &PenConfig) -> Result<(), StorageError>;
}

/// Pen configuration kept as TOML, by default at `~/.config/inkboard/pen.toml`.
#[derive(Debug, Clone)]
pub struct FilePenStore {
    path: PathBuf,
}

impl FilePenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location next to the config file.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("inkboard");
        Ok(config_dir.join("pen.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PenStore for FilePenStore {
    fn load(&self) -> Result<Option<PenConfig>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No pen file at {}", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(StorageError::io(&self.path)(err)),
        };

        toml::from_str(&text)
            .map(Some)
            .map_err(|e| StorageError::Decode(format!("{}: {e}", self.path.display())))
    }

    fn save(&self, pen: &PenConfig) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StorageError::io(parent))?;
        }

        let text = toml::to_string_pretty(pen).map_err(|e| StorageError::Encode(e.to_string()))?;
        let tmp_path = self.path.with_extension("toml.tmp");
        fs::write(&tmp_path, text).map_err(StorageError::io(&tmp_path))?;
        fs::rename(&tmp_path, &self.path).map_err(StorageError::io(&self.path))?;
        debug!("Saved pen configuration to {}", self.path.display());
        Ok(())
    }
}

/// In-process pen store.
#[derive(Debug, Default)]
pub struct MemoryPenStore {
    pen: Mutex<Option<PenConfig>>,
}

impl MemoryPenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pen(pen: PenConfig) -> Self {
        Self {
            pen: Mutex::new(Some(pen)),
        }
    }

    /// Last saved value.
    pub fn saved(&self) -> Option<PenConfig> {
        *self.pen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PenStore for MemoryPenStore {
    fn load(&self) -> Result<Option<PenConfig>, StorageError> {
        Ok(self.saved())
    }

    fn save(&self, pen: &PenConfig) -> Result<(), StorageError> {
        *self.pen.lock().unwrap_or_else(PoisonError::into_inner) = Some(*pen);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Color, RED};
    use crate::input::ToolMode;

    #[test]
    fn file_store_round_trips_pen() {
        let temp = tempfile::tempdir().unwrap();
        let store = FilePenStore::new(temp.path().join("nested").join("pen.toml"));
        assert!(store.load().unwrap().is_none());

        let pen = PenConfig {
            color: Color::from_rgb8(0x12, 0x34, 0x56),
            stroke_width: 7.0,
            tool_mode: ToolMode::Highlighter,
        };
        store.save(&pen).unwrap();
        assert_eq!(store.load().unwrap(), Some(pen));

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("tool_mode = \"highlighter\""));
    }

    #[test]
    fn file_store_reports_bad_toml() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pen.toml");
        fs::write(&path, "color = [").unwrap();
        let err = FilePenStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Decode(_)));
    }

    #[test]
    fn partial_file_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pen.toml");
        fs::write(&path, "color = \"red\"\n").unwrap();
        let pen = FilePenStore::new(&path).load().unwrap().unwrap();
        assert_eq!(pen.color, RED);
        assert_eq!(pen.stroke_width, 2.0);
        assert_eq!(pen.tool_mode, ToolMode::Normal);
    }
}
