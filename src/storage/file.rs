use super::codec;
use super::options::{CompressionMode, StorageOptions};
use super::store::RecordStore;
use super::types::{RecordId, StorageError};
use crate::input::ToolMode;
use anyhow::{Context, Result};
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use fs2::FileExt;
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Record store keeping one JSON file per record under a storage directory.
///
/// Writes take an exclusive lock on a sibling `.lock` file, go to a temporary
/// file first and are renamed into place, optionally rotating the previous
/// file to `.bak`. Reads take a shared lock and transparently gunzip.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    options: StorageOptions,
}

/// Result of clearing on-disk record data.
#[derive(Debug, Clone, Copy)]
pub struct ClearOutcome {
    pub removed_record: bool,
    pub removed_backup: bool,
    pub removed_lock: bool,
}

/// Summary information about a stored record, for CLI reporting.
#[derive(Debug, Clone)]
pub struct RecordInspection {
    pub record_path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<SystemTime>,
    pub backup_path: PathBuf,
    pub backup_exists: bool,
    pub backup_size_bytes: Option<u64>,
    pub stroke_counts: Option<StrokeCounts>,
    pub skipped_entries: usize,
    pub compressed: bool,
}

/// Stroke counts per tool for a stored board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrokeCounts {
    pub normal: usize,
    pub telestrator: usize,
    pub highlighter: usize,
    pub eraser: usize,
}

impl StrokeCounts {
    pub fn total(&self) -> usize {
        self.normal + self.telestrator + self.highlighter + self.eraser
    }
}

struct LoadedRecord {
    text: String,
    compressed: bool,
}

impl FileRecordStore {
    pub fn new(options: StorageOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    /// Remove persisted files for a record (data, backup, and lock).
    pub fn clear(&self, record: &RecordId) -> Result<ClearOutcome> {
        Ok(ClearOutcome {
            removed_record: remove_file_if_exists(&self.options.record_file_path(record))?,
            removed_backup: remove_file_if_exists(&self.options.backup_file_path(record))?,
            removed_lock: remove_file_if_exists(&self.options.lock_file_path(record))?,
        })
    }

    /// Inspect the stored file for a record.
    pub fn inspect(&self, record: &RecordId) -> Result<RecordInspection> {
        let record_path = self.options.record_file_path(record);
        let metadata = fs::metadata(&record_path).ok();
        let exists = metadata.is_some();
        let size_bytes = metadata.as_ref().map(|m| m.len());
        let modified = metadata.as_ref().and_then(|m| m.modified().ok());

        let backup_path = self.options.backup_file_path(record);
        let backup_meta = fs::metadata(&backup_path).ok();

        let mut stroke_counts = None;
        let mut skipped_entries = 0;
        let mut compressed = false;

        if exists {
            let loaded = self
                .with_lock(record, LockKind::Shared, || load_record_inner(&record_path))
                .with_context(|| format!("failed to read record file {}", record_path.display()))?;

            if let Some(loaded) = loaded {
                let decoded = codec::decode(&loaded.text);
                let mut counts = StrokeCounts::default();
                for stroke in &decoded.strokes {
                    match stroke.tool_mode() {
                        ToolMode::Normal => counts.normal += 1,
                        ToolMode::Telestrator => counts.telestrator += 1,
                        ToolMode::Highlighter => counts.highlighter += 1,
                        ToolMode::Eraser => counts.eraser += 1,
                    }
                }
                stroke_counts = Some(counts);
                skipped_entries = decoded.skipped;
                compressed = loaded.compressed;
            }
        }

        Ok(RecordInspection {
            record_path,
            exists,
            size_bytes,
            modified,
            backup_path,
            backup_exists: backup_meta.is_some(),
            backup_size_bytes: backup_meta.as_ref().map(|m| m.len()),
            stroke_counts,
            skipped_entries,
            compressed,
        })
    }

    fn with_lock<T>(
        &self,
        record: &RecordId,
        kind: LockKind,
        f: impl FnOnce() -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        fs::create_dir_all(&self.options.base_dir)
            .map_err(StorageError::io(&self.options.base_dir))?;

        let lock_path = self.options.lock_file_path(record);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(StorageError::io(&lock_path))?;
        let locked = match kind {
            LockKind::Shared => lock_file.lock_shared(),
            LockKind::Exclusive => lock_file.lock_exclusive(),
        };
        locked.map_err(StorageError::lock(&lock_path))?;

        let result = f();

        lock_file.unlock().unwrap_or_else(|err| {
            warn!(
                "failed to unlock record file {}: {}",
                lock_path.display(),
                err
            )
        });

        result
    }

    fn write_record_inner(&self, record: &RecordId, value: &str) -> Result<(), StorageError> {
        let record_path = self.options.record_file_path(record);
        let backup_path = self.options.backup_file_path(record);

        let mut bytes = value.as_bytes().to_vec();
        if bytes.len() as u64 > self.options.max_file_size_bytes {
            return Err(StorageError::TooLarge {
                path: record_path,
                size: bytes.len() as u64,
                limit: self.options.max_file_size_bytes,
            });
        }

        let should_compress = match self.options.compression {
            CompressionMode::Off => false,
            CompressionMode::On => true,
            CompressionMode::Auto => {
                (bytes.len() as u64) >= self.options.auto_compress_threshold_bytes
            }
        };

        if should_compress {
            bytes = compress_bytes(&bytes).map_err(StorageError::io(&record_path))?;
        }

        let tmp_path = temp_path(&record_path);
        {
            let mut tmp_file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp_path)
                .map_err(StorageError::io(&tmp_path))?;
            tmp_file
                .write_all(&bytes)
                .map_err(StorageError::io(&tmp_path))?;
            tmp_file.sync_all().map_err(StorageError::io(&tmp_path))?;
        }

        if record_path.exists() {
            if self.options.backup_retention > 0 {
                if backup_path.exists() {
                    fs::remove_file(&backup_path).ok();
                }
                fs::rename(&record_path, &backup_path).map_err(StorageError::io(&backup_path))?;
            } else {
                fs::remove_file(&record_path).ok();
            }
        }

        fs::rename(&tmp_path, &record_path).map_err(StorageError::io(&record_path))?;

        info!(
            "Board saved to {} ({} bytes, compression={})",
            record_path.display(),
            bytes.len(),
            should_compress
        );

        Ok(())
    }
}

#[derive(Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

impl RecordStore for FileRecordStore {
    fn get(&self, record: &RecordId) -> Result<Option<String>, StorageError> {
        let record_path = self.options.record_file_path(record);
        if !record_path.exists() {
            debug!(
                "No board file present at {}, starting empty",
                record_path.display()
            );
            return Ok(None);
        }

        let metadata = fs::metadata(&record_path).map_err(StorageError::io(&record_path))?;
        if metadata.len() > self.options.max_file_size_bytes {
            return Err(StorageError::TooLarge {
                path: record_path,
                size: metadata.len(),
                limit: self.options.max_file_size_bytes,
            });
        }

        let loaded = self.with_lock(record, LockKind::Shared, || load_record_inner(&record_path))?;
        Ok(loaded.map(|loaded| loaded.text))
    }

    fn set(&self, record: &RecordId, value: &str) -> Result<(), StorageError> {
        self.with_lock(record, LockKind::Exclusive, || {
            self.write_record_inner(record, value)
        })
    }

    fn remove(&self, record: &RecordId) -> Result<bool, StorageError> {
        let record_path = self.options.record_file_path(record);
        self.with_lock(record, LockKind::Exclusive, || {
            if record_path.exists() {
                fs::remove_file(&record_path).map_err(StorageError::io(&record_path))?;
                Ok(true)
            } else {
                Ok(false)
            }
        })
    }
}

fn load_record_inner(record_path: &Path) -> Result<Option<LoadedRecord>, StorageError> {
    let mut file_bytes = Vec::new();
    {
        let mut file = match File::open(record_path) {
            Ok(file) => file,
            // Removed between the existence check and the lock
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::io(record_path)(err)),
        };
        file.read_to_end(&mut file_bytes)
            .map_err(StorageError::io(record_path))?;
    }

    let compressed = is_gzip(&file_bytes);
    let decompressed = if compressed {
        let mut decoder = GzDecoder::new(&file_bytes[..]);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| StorageError::Decode(format!("failed to decompress board file: {e}")))?;
        out
    } else {
        file_bytes
    };

    let text = String::from_utf8(decompressed)
        .map_err(|e| StorageError::Decode(format!("board file is not UTF-8: {e}")))?;

    Ok(Some(LoadedRecord { text, compressed }))
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn compress_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

fn temp_path(target: &Path) -> PathBuf {
    let mut candidate = target.with_extension("json.tmp");
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_extension(format!("json.tmp{}", counter));
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path, compression: CompressionMode) -> FileRecordStore {
        let mut options = StorageOptions::new(dir.to_path_buf());
        options.compression = compression;
        FileRecordStore::new(options)
    }

    const BOARD: &str = r#"[{"path":"M0 0 L1 1","color":"red","strokeWidth":3,"isEraser":false,"toolMode":"normal"},{"path":"M2 2 L3 3","color":"yellow","strokeWidth":4,"isEraser":false,"toolMode":"highlighter"}]"#;

    #[test]
    fn missing_record_reads_as_none() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path(), CompressionMode::Off);
        assert!(store.get(&RecordId::new("r1")).unwrap().is_none());
    }

    #[test]
    fn set_then_get_plain_and_backup_rotation() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path(), CompressionMode::Off);
        let record = RecordId::new("r1");

        store.set(&record, "[]").unwrap();
        store.set(&record, BOARD).unwrap();

        assert_eq!(store.get(&record).unwrap().as_deref(), Some(BOARD));
        let backup = fs::read_to_string(store.options().backup_file_path(&record)).unwrap();
        assert_eq!(backup, "[]");
    }

    #[test]
    fn compressed_files_are_detected_on_read() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path(), CompressionMode::On);
        let record = RecordId::new("gz");

        store.set(&record, BOARD).unwrap();
        let raw = fs::read(store.options().record_file_path(&record)).unwrap();
        assert!(is_gzip(&raw));
        assert_eq!(store.get(&record).unwrap().as_deref(), Some(BOARD));

        let inspection = store.inspect(&record).unwrap();
        assert!(inspection.compressed);
        let counts = inspection.stroke_counts.unwrap();
        assert_eq!(counts.normal, 1);
        assert_eq!(counts.highlighter, 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn auto_compression_respects_threshold() {
        let temp = tempfile::tempdir().unwrap();
        let mut options = StorageOptions::new(temp.path().to_path_buf());
        options.compression = CompressionMode::Auto;
        options.auto_compress_threshold_bytes = 64;
        let store = FileRecordStore::new(options);

        store.set(&RecordId::new("small"), "[]").unwrap();
        store.set(&RecordId::new("large"), BOARD).unwrap();

        let small = fs::read(store.options().record_file_path(&RecordId::new("small"))).unwrap();
        let large = fs::read(store.options().record_file_path(&RecordId::new("large"))).unwrap();
        assert!(!is_gzip(&small));
        assert!(is_gzip(&large));
    }

    #[test]
    fn no_backup_when_retention_is_zero() {
        let temp = tempfile::tempdir().unwrap();
        let mut options = StorageOptions::new(temp.path().to_path_buf());
        options.backup_retention = 0;
        let store = FileRecordStore::new(options);
        let record = RecordId::new("r");

        store.set(&record, "[]").unwrap();
        store.set(&record, BOARD).unwrap();
        assert!(!store.options().backup_file_path(&record).exists());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let mut options = StorageOptions::new(temp.path().to_path_buf());
        options.max_file_size_bytes = 8;
        let store = FileRecordStore::new(options);
        let record = RecordId::new("big");

        let err = store.set(&record, BOARD).unwrap_err();
        assert!(matches!(
            err,
            StorageError::TooLarge { limit: 8, size, .. } if size == BOARD.len() as u64
        ));
        assert!(store.get(&record).unwrap().is_none());
    }

    #[test]
    fn similar_record_ids_use_separate_files() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path(), CompressionMode::Off);
        let slash = RecordId::new("meet/1");
        let underscore = RecordId::new("meet_1");

        store.set(&slash, "[\"M0 0\"]").unwrap();
        store.set(&underscore, BOARD).unwrap();

        assert_eq!(store.get(&slash).unwrap().as_deref(), Some("[\"M0 0\"]"));
        assert_eq!(store.get(&underscore).unwrap().as_deref(), Some(BOARD));
        assert_ne!(
            store.options().record_file_path(&slash),
            store.options().record_file_path(&underscore)
        );
    }

    #[test]
    fn remove_and_clear() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path(), CompressionMode::Off);
        let record = RecordId::new("r");

        store.set(&record, "[]").unwrap();
        store.set(&record, BOARD).unwrap();
        assert!(store.remove(&record).unwrap());
        assert!(!store.remove(&record).unwrap());

        let outcome = store.clear(&record).unwrap();
        assert!(!outcome.removed_record);
        assert!(outcome.removed_backup);
        assert!(outcome.removed_lock);
    }

    #[test]
    fn inspect_missing_record() {
        let temp = tempfile::tempdir().unwrap();
        let store = store(temp.path(), CompressionMode::Off);
        let inspection = store.inspect(&RecordId::new("none")).unwrap();
        assert!(!inspection.exists);
        assert!(inspection.stroke_counts.is_none());
        assert!(!inspection.backup_exists);
    }
}
