use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const PENDING_AWARD_VERSION: u32 = 1;

/// Durably persisted, unconfirmed intent to credit the player's account.
/// One slot per game-mode key; written before any network attempt,
/// mutated never, cleared only after the remote increment confirms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAward {
    pub version: u32,
    pub points: i64,
    pub exp: i64,
    pub context: String,
    pub created_at_ms: u64,
}

impl PendingAward {
    pub fn new(points: i64, exp: i64, context: impl Into<String>, created_at_ms: u64) -> Self {
        Self {
            version: PENDING_AWARD_VERSION,
            points,
            exp,
            context: context.into(),
            created_at_ms,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.points == 0 && self.exp == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Reload-surviving key-value slot store. Implementations must complete
/// `set` synchronously before returning; the pipeline relies on the write
/// landing before the network call is issued.
pub trait PendingStore {
    fn set(&mut self, key: &str, json: &str) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

pub fn write_pending(
    store: &mut dyn PendingStore,
    key: &str,
    award: &PendingAward,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(award)
        .map_err(|err| StoreError::Backend(err.to_string()))?;
    store.set(key, &json)
}

/// Read and validate the pending slot. An unreadable or version-skewed
/// record is treated as absent.
pub fn read_pending(store: &dyn PendingStore, key: &str) -> Option<PendingAward> {
    let json = store.get(key).ok().flatten()?;
    let award: PendingAward = serde_json::from_str(&json).ok()?;
    if award.version != PENDING_AWARD_VERSION {
        return None;
    }
    Some(award)
}

/// In-memory store for tests and the demo harness. A "reload" is
/// simulated by keeping the store and discarding everything else.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PendingStore for MemoryStore {
    fn set(&mut self, key: &str, json: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
