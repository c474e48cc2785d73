//! Durable snapshot storage port.
//!
//! Path history and circuit breaker state are persisted as opaque byte
//! snapshots under a fixed key. Callers own the encoding.

use async_trait::async_trait;

use crate::error::StoreError;

/// Key under which path history is stored.
pub const PATH_HISTORY_KEY: &str = "path_history";

/// Key under which circuit breaker state is stored.
pub const CIRCUIT_BREAKER_KEY: &str = "circuit_breaker";

/// Load/save byte snapshots by key.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load a snapshot. `Ok(None)` when nothing was saved yet.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Save a snapshot, replacing any previous one.
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}
