use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::codec;
use super::options::{DEFAULT_DEBOUNCE, DEFAULT_MAX_PERSISTED};
use super::store::RecordStore;
use super::types::{RecordId, StorageError};
use crate::draw::Stroke;

/// Debounced writer between boards and a [`RecordStore`].
///
/// Every [`schedule`](Self::schedule) call restarts the idle timer for its
/// record; only the trailing snapshot is written. Each scheduled save carries
/// a generation number and writes for the same record are serialized, so an
/// older snapshot never lands after a newer one.
///
/// Timers run on the injected tokio runtime; the store itself is called on
/// the blocking pool (or on the caller's thread for [`flush`](Self::flush)).
#[derive(Clone)]
pub struct PersistenceGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    runtime: Handle,
    store: Arc<dyn RecordStore>,
    delay: Duration,
    max_persisted: usize,
    generation: AtomicU64,
    pending: Mutex<HashMap<RecordId, PendingSave>>,
    slots: Mutex<HashMap<RecordId, Arc<Mutex<WriteSlot>>>>,
}

struct PendingSave {
    generation: u64,
    strokes: Arc<Vec<Stroke>>,
    task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct WriteSlot {
    last_written: u64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PersistenceGateway {
    /// Creates a gateway with the default one second debounce.
    ///
    /// # Arguments
    /// * `runtime` - Tokio runtime handle for spawning timers
    /// * `store` - Backing store for serialized boards
    pub fn new(runtime: &Handle, store: Arc<dyn RecordStore>) -> Self {
        Self::with_settings(runtime, store, DEFAULT_DEBOUNCE, DEFAULT_MAX_PERSISTED)
    }

    pub fn with_settings(
        runtime: &Handle,
        store: Arc<dyn RecordStore>,
        delay: Duration,
        max_persisted: usize,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                runtime: runtime.clone(),
                store,
                delay,
                max_persisted,
                generation: AtomicU64::new(0),
                pending: Mutex::new(HashMap::new()),
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Reads and decodes the stored board for `record`.
    ///
    /// A missing record yields an empty list. Malformed entries are skipped.
    pub fn load(&self, record: &RecordId) -> Result<Vec<Stroke>, StorageError> {
        let Some(text) = self.inner.store.get(record)? else {
            debug!("No stored board for record {record}");
            return Ok(Vec::new());
        };

        let decoded = codec::decode(&text);
        info!(
            "Loaded {} strokes for record {} ({} skipped{})",
            decoded.strokes.len(),
            record,
            decoded.skipped,
            if decoded.recovered {
                ", recovered from damaged data"
            } else {
                ""
            }
        );
        Ok(decoded.strokes)
    }

    /// (Re)starts the idle timer for `record` with a new snapshot.
    pub fn schedule(&self, record: &RecordId, strokes: Vec<Stroke>) {
        let inner = &self.inner;
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let strokes = Arc::new(strokes);

        // Held across the spawn so a zero delay cannot fire before the entry exists.
        let mut pending = lock(&inner.pending);

        let task = {
            let inner = Arc::clone(inner);
            let record = record.clone();
            let strokes = Arc::clone(&strokes);
            inner.runtime.clone().spawn(async move {
                tokio::time::sleep(inner.delay).await;
                if !inner.is_current(&record, generation) {
                    return;
                }
                let writer = Arc::clone(&inner);
                let result = tokio::task::spawn_blocking(move || {
                    match writer.write(&record, generation, &strokes) {
                        Ok(_) => writer.finish_pending(&record, generation),
                        // The entry stays pending so the next flush retries it.
                        Err(err) => error!(
                            "Failed to save board for record {record} (generation {generation}): {err}"
                        ),
                    }
                })
                .await;
                if let Err(err) = result {
                    error!("Debounced board save task failed: {err}");
                }
            })
        };

        let previous = pending.insert(
            record.clone(),
            PendingSave {
                generation,
                strokes,
                task: Some(task),
            },
        );
        drop(pending);

        if let Some(mut previous) = previous {
            previous.abort();
            debug!(
                "Save for record {} superseded (generation {} -> {})",
                record, previous.generation, generation
            );
        }
    }

    /// Cancels the pending timer for `record` and writes its snapshot now.
    ///
    /// Runs on the caller's thread and returns once the latest snapshot is on
    /// the store, even if a timer write for it is already in flight. Returns
    /// `Ok(false)` when nothing needed writing.
    ///
    /// A failed write leaves the snapshot pending, so a later flush (or
    /// [`flush_all`](Self::flush_all)) tries it again.
    pub fn flush(&self, record: &RecordId) -> Result<bool, StorageError> {
        let pending = lock(&self.inner.pending).remove(record);
        let Some(mut pending) = pending else {
            return Ok(false);
        };
        pending.abort();
        match self
            .inner
            .write(record, pending.generation, &pending.strokes)
        {
            Ok(written) => Ok(written),
            Err(err) => {
                self.inner.restore_pending(record, pending);
                Err(err)
            }
        }
    }

    /// Flushes every record with a pending save. Failures are logged.
    pub fn flush_all(&self) {
        let records: Vec<RecordId> = lock(&self.inner.pending).keys().cloned().collect();
        for record in records {
            if let Err(err) = self.flush(&record) {
                error!("Failed to flush board for record {record}: {err}");
            }
        }
    }

    /// Drops the pending save for `record` without writing it.
    pub fn cancel(&self, record: &RecordId) -> bool {
        match lock(&self.inner.pending).remove(record) {
            Some(mut pending) => {
                pending.abort();
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self, record: &RecordId) -> bool {
        lock(&self.inner.pending).contains_key(record)
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl PendingSave {
    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl GatewayInner {
    fn is_current(&self, record: &RecordId, generation: u64) -> bool {
        lock(&self.pending)
            .get(record)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Removes the pending entry once its write is done, unless superseded.
    fn finish_pending(&self, record: &RecordId, generation: u64) {
        let mut pending = lock(&self.pending);
        if pending
            .get(record)
            .is_some_and(|entry| entry.generation == generation)
        {
            pending.remove(record);
        }
    }

    /// Puts a snapshot whose write failed back, unless a newer one arrived meanwhile.
    fn restore_pending(&self, record: &RecordId, save: PendingSave) {
        let mut pending = lock(&self.pending);
        if pending
            .get(record)
            .is_none_or(|entry| entry.generation < save.generation)
        {
            pending.insert(record.clone(), save);
        }
    }

    fn slot(&self, record: &RecordId) -> Arc<Mutex<WriteSlot>> {
        Arc::clone(lock(&self.slots).entry(record.clone()).or_default())
    }

    fn write(
        &self,
        record: &RecordId,
        generation: u64,
        strokes: &[Stroke],
    ) -> Result<bool, StorageError> {
        let slot_lock = self.slot(record);
        let mut slot = lock(&*slot_lock);
        if generation <= slot.last_written {
            debug!(
                "Skipping stale save for record {} (generation {} <= {})",
                record, generation, slot.last_written
            );
            return Ok(false);
        }

        let payload = codec::encode(strokes, self.max_persisted)?;
        self.store.set(record, &payload)?;
        slot.last_written = generation;
        debug!(
            "Persisted {} strokes for record {} (generation {})",
            strokes.len().min(self.max_persisted),
            record,
            generation
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Path, Point, RED};
    use crate::input::ToolMode;
    use crate::storage::MemoryRecordStore;

    fn strokes(count: usize) -> Vec<Stroke> {
        (0..count)
            .filter_map(|n| {
                Stroke::new(
                    Path::from_points(&[Point::new(n as f64, 0.0), Point::new(n as f64, 1.0)]),
                    RED,
                    2.0,
                    ToolMode::Normal,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn older_generation_never_overwrites_newer() {
        let store = Arc::new(MemoryRecordStore::new());
        let gateway = PersistenceGateway::new(&Handle::current(), store.clone());
        let record = RecordId::new("r1");

        assert!(gateway.inner.write(&record, 2, &strokes(2)).unwrap());
        assert!(!gateway.inner.write(&record, 1, &strokes(1)).unwrap());
        assert!(!gateway.inner.write(&record, 2, &strokes(3)).unwrap());

        let text = store.get(&record).unwrap().unwrap();
        assert_eq!(codec::decode(&text).strokes, strokes(2));
    }

    #[tokio::test]
    async fn restored_save_never_replaces_a_newer_one() {
        let store = Arc::new(MemoryRecordStore::new());
        let gateway = PersistenceGateway::new(&Handle::current(), store.clone());
        let record = RecordId::new("r1");
        let save = |generation, count| PendingSave {
            generation,
            strokes: Arc::new(strokes(count)),
            task: None,
        };

        gateway.inner.restore_pending(&record, save(4, 2));
        gateway.inner.restore_pending(&record, save(3, 1));
        assert!(gateway.flush(&record).unwrap());

        let text = store.get(&record).unwrap().unwrap();
        assert_eq!(codec::decode(&text).strokes, strokes(2));
        assert!(!gateway.has_pending(&record));
    }
}
