//! Board persistence.
//!
//! Serializes committed strokes to the textual wire format, writes them through
//! a debounced gateway to a keyed [`RecordStore`], and loads them back with
//! tolerant decoding. The file-backed store adds locking, optional compression
//! and backup rotation.

pub mod codec;
mod file;
mod gateway;
mod options;
mod store;
mod types;

pub use file::{ClearOutcome, FileRecordStore, RecordInspection, StrokeCounts};
pub use gateway::PersistenceGateway;
pub use options::{
    CompressionMode, DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES, DEFAULT_DEBOUNCE,
    DEFAULT_MAX_PERSISTED, StorageOptions, options_from_config,
};
pub use store::{MemoryRecordStore, RecordStore};
pub use types::{RecordId, StorageError};
