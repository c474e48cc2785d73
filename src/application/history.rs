//! Durable per-path performance history.
//!
//! In-memory state is authoritative. Every mutation is followed by a
//! snapshot save; save failures are logged and otherwise ignored.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::domain::{history::PathHistoryRecord, id::PathKey};
use crate::port::outbound::store::{SnapshotStore, PATH_HISTORY_KEY};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    records: Vec<PathHistoryRecord>,
}

/// Process-wide path history.
pub struct PathHistoryStore {
    records: RwLock<HashMap<PathKey, PathHistoryRecord>>,
    store: Arc<dyn SnapshotStore>,
    // Serializes record+save so snapshots land in mutation order.
    write_gate: AsyncMutex<()>,
}

impl PathHistoryStore {
    /// Empty history backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            store,
            write_gate: AsyncMutex::new(()),
        }
    }

    /// Load the persisted snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty history.
    /// Records whose counters disagree are dropped individually.
    pub async fn load(store: Arc<dyn SnapshotStore>) -> Self {
        let history = Self::new(store);
        let bytes = match history.store.load(PATH_HISTORY_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("No path history snapshot, starting empty");
                return history;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load path history, starting empty");
                return history;
            }
        };

        match serde_json::from_slice::<Snapshot>(&bytes) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
                let mut records = history.records.write();
                let mut dropped = 0usize;
                for record in snapshot.records {
                    if !record.is_consistent() {
                        warn!(
                            path = %record.key(),
                            attempts = record.attempts(),
                            successes = record.successes(),
                            failures = record.failures(),
                            "Inconsistent path history record dropped"
                        );
                        dropped += 1;
                        continue;
                    }
                    records.insert(record.key().clone(), record);
                }
                info!(paths = records.len(), dropped, "Path history loaded");
            }
            Ok(snapshot) => {
                warn!(
                    version = snapshot.version,
                    "Unsupported path history snapshot version, starting empty"
                );
            }
            Err(e) => {
                warn!(error = %e, "Corrupt path history snapshot, starting empty");
            }
        }
        history
    }

    /// Record one attempt on `key` and persist.
    pub async fn record_attempt(&self, key: &PathKey, success: bool, profit_percent: f64) {
        self.record_attempt_at(key, success, profit_percent, Utc::now())
            .await;
    }

    /// [`record_attempt`](Self::record_attempt) with an explicit timestamp.
    pub async fn record_attempt_at(
        &self,
        key: &PathKey,
        success: bool,
        profit_percent: f64,
        at: DateTime<Utc>,
    ) {
        let _gate = self.write_gate.lock().await;
        let bytes = {
            let mut records = self.records.write();
            records
                .entry(key.clone())
                .or_insert_with(|| PathHistoryRecord::new(key.clone()))
                .record(success, profit_percent, at);
            Self::encode(&records)
        };
        self.persist(bytes).await;
    }

    /// History for a path, or `None` when it has never been attempted.
    #[must_use]
    pub fn get(&self, key: &PathKey) -> Option<PathHistoryRecord> {
        self.records.read().get(key).cloned()
    }

    /// Snapshot of every record, ordered by key.
    #[must_use]
    pub fn all(&self) -> Vec<PathHistoryRecord> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.key().cmp(b.key()));
        records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn encode(records: &HashMap<PathKey, PathHistoryRecord>) -> Option<Vec<u8>> {
        let mut sorted: Vec<_> = records.values().cloned().collect();
        sorted.sort_by(|a, b| a.key().cmp(b.key()));
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            records: sorted,
        };
        match serde_json::to_vec(&snapshot) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Failed to encode path history");
                None
            }
        }
    }

    async fn persist(&self, bytes: Option<Vec<u8>>) {
        let Some(bytes) = bytes else { return };
        if let Err(e) = self.store.save(PATH_HISTORY_KEY, &bytes).await {
            warn!(error = %e, "Failed to persist path history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::store::MemoryStore;

    fn key() -> PathKey {
        PathKey::from("USDC->SOL->USDC")
    }

    #[tokio::test]
    async fn test_get_without_history_is_none() {
        let history = PathHistoryStore::new(Arc::new(MemoryStore::new()));
        assert!(history.get(&key()).is_none());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_record_persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let history = PathHistoryStore::new(store.clone());
        history.record_attempt(&key(), true, 1.5).await;
        history.record_attempt(&key(), false, -0.5).await;
        assert_eq!(store.saves(), 2);

        let reloaded = PathHistoryStore::load(store).await;
        let record = reloaded.get(&key()).unwrap();
        assert_eq!(record.attempts(), 2);
        assert_eq!(record.successes(), 1);
        assert!((record.average_profit_percent() - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_inconsistent_records_are_dropped_on_load() {
        let other = PathKey::from("USDC->BONK->USDC");
        let store = Arc::new(MemoryStore::new());
        let history = PathHistoryStore::new(store.clone());
        history.record_attempt(&key(), true, 1.5).await;
        history.record_attempt(&other, false, -0.5).await;

        let mut snapshot: serde_json::Value =
            serde_json::from_slice(&store.get(PATH_HISTORY_KEY).unwrap()).unwrap();
        for record in snapshot["records"].as_array_mut().unwrap() {
            if record["key"] == serde_json::json!(key().to_string()) {
                record["attempts"] = serde_json::json!(5);
            }
        }
        let tampered = Arc::new(
            MemoryStore::new().with_entry(PATH_HISTORY_KEY, serde_json::to_vec(&snapshot).unwrap()),
        );

        let reloaded = PathHistoryStore::load(tampered).await;
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get(&key()).is_none());
        assert_eq!(reloaded.get(&other).unwrap().failures(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_memory_state() {
        let store = Arc::new(MemoryStore::new());
        store.set_failing(true);
        let history = PathHistoryStore::new(store.clone());

        history.record_attempt(&key(), true, 2.0).await;
        assert_eq!(history.get(&key()).unwrap().attempts(), 1);
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let store = Arc::new(MemoryStore::new().with_entry(PATH_HISTORY_KEY, "{not json"));
        let history = PathHistoryStore::load(store).await;
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let history = Arc::new(PathHistoryStore::new(Arc::new(MemoryStore::new())));
        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let history = history.clone();
                tokio::spawn(async move {
                    history.record_attempt(&key(), i % 2 == 0, 0.5).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        let record = history.get(&key()).unwrap();
        assert_eq!(record.attempts(), 20);
        assert_eq!(record.successes() + record.failures(), 20);
    }
}
