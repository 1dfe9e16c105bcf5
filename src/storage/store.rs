use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::types::{RecordId, StorageError};

/// Keyed text store holding one serialized board per record.
///
/// Implementations are called from the save scheduler's blocking pool and
/// from the caller's thread on close, so they must be thread-safe.
pub trait RecordStore: Send + Sync {
    /// Returns the stored value, or `None` when the record has never been saved.
    fn get(&self, record: &RecordId) -> Result<Option<String>, StorageError>;

    /// Overwrites the stored value.
    fn set(&self, record: &RecordId, value: &str) -> Result<(), StorageError>;

    /// Removes the stored value. Returns whether anything was removed.
    fn remove(&self, record: &RecordId) -> Result<bool, StorageError>;
}

/// In-process store, used by tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<RecordId, String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record with raw text.
    pub fn with_record(self, record: impl Into<RecordId>, value: impl Into<String>) -> Self {
        self.lock().insert(record.into(), value.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RecordId, String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, record: &RecordId) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(record).cloned())
    }

    fn set(&self, record: &RecordId, value: &str) -> Result<(), StorageError> {
        self.lock().insert(record.clone(), value.to_string());
        Ok(())
    }

    fn remove(&self, record: &RecordId) -> Result<bool, StorageError> {
        Ok(self.lock().remove(record).is_some())
    }
}
