//! In-memory record store
//!
//! Gives the same guarantees the protocols rely on from a networked store:
//! atomic create-if-absent and version-checked update. Versions are drawn
//! from a single monotonic counter, so a token is never reused.

use async_trait::async_trait;
use certsync_core::effects::{RecordStoreEffects, StoreError};
use certsync_core::{RecordId, RecordVersion, SharedRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<RecordId, SharedRecord>,
    next_version: u64,
    creates: u64,
    updates: u64,
}

impl StoreState {
    fn bump_version(&mut self) -> RecordVersion {
        self.next_version += 1;
        RecordVersion::new(self.next_version.to_string())
    }
}

/// In-memory record store for tests and single-process embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful creates since construction
    pub async fn create_count(&self) -> u64 {
        self.state.read().await.creates
    }

    /// Number of successful updates since construction
    pub async fn update_count(&self) -> u64 {
        self.state.read().await.updates
    }

    /// Stored copy of a record, if any
    pub async fn snapshot(&self, id: &RecordId) -> Option<SharedRecord> {
        self.state.read().await.records.get(id).cloned()
    }

    /// Store a record unconditionally, bypassing create semantics.
    ///
    /// For seeding fixtures, including records without data.
    pub async fn insert(&self, mut record: SharedRecord) -> SharedRecord {
        let mut state = self.state.write().await;
        record.version = Some(state.bump_version());
        state.records.insert(record.id.clone(), record.clone());
        record
    }
}

#[async_trait]
impl RecordStoreEffects for MemoryRecordStore {
    async fn get(&self, id: &RecordId) -> Result<SharedRecord, StoreError> {
        let state = self.state.read().await;
        state
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { record: id.clone() })
    }

    async fn create(&self, mut record: SharedRecord) -> Result<SharedRecord, StoreError> {
        let mut state = self.state.write().await;
        if state.records.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists {
                record: record.id.clone(),
            });
        }

        record.version = Some(state.bump_version());
        state.creates += 1;
        state.records.insert(record.id.clone(), record.clone());
        debug!(record = %record.id, entries = record.len(), "Created record");
        Ok(record)
    }

    async fn update(&self, mut record: SharedRecord) -> Result<SharedRecord, StoreError> {
        let mut state = self.state.write().await;
        let current = state
            .records
            .get(&record.id)
            .ok_or_else(|| StoreError::NotFound {
                record: record.id.clone(),
            })?;

        if current.version != record.version {
            return Err(StoreError::Conflict {
                record: record.id.clone(),
                reason: format!(
                    "expected version {}, found {}",
                    display_version(record.version.as_ref()),
                    display_version(current.version.as_ref())
                ),
            });
        }

        record.version = Some(state.bump_version());
        state.updates += 1;
        state.records.insert(record.id.clone(), record.clone());
        debug!(record = %record.id, entries = record.len(), "Updated record");
        Ok(record)
    }
}

fn display_version(version: Option<&RecordVersion>) -> String {
    version.map_or_else(|| "<none>".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;

    fn record(entries: &[(&str, &[u8])]) -> SharedRecord {
        let data: BTreeMap<String, Vec<u8>> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_vec()))
            .collect();
        SharedRecord::new(RecordId::for_cluster("ns1", "vc1"), data)
    }

    #[tokio::test]
    async fn test_create_is_exclusive() {
        let store = MemoryRecordStore::new();
        let created = store.create(record(&[("ca.crt", b"a")])).await.unwrap();
        assert!(created.version.is_some());

        let second = store.create(record(&[("ca.crt", b"b")])).await;
        assert_matches!(second, Err(StoreError::AlreadyExists { .. }));

        let stored = store.get(&created.id).await.unwrap();
        assert_eq!(stored.get("ca.crt"), Some(b"a".as_slice()));
        assert_eq!(store.create_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let store = MemoryRecordStore::new();
        let result = store.get(&RecordId::for_cluster("ns1", "vc1")).await;
        assert_matches!(result, Err(StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stale_update_rejected() {
        let store = MemoryRecordStore::new();
        let created = store.create(record(&[("ca.crt", b"a")])).await.unwrap();

        let mut first = created.clone();
        first.data.as_mut().unwrap().insert("k0s.crt".into(), b"x".to_vec());
        let updated = store.update(first).await.unwrap();
        assert_ne!(updated.version, created.version);

        let mut stale = created;
        stale.data.as_mut().unwrap().insert("k0s.crt".into(), b"y".to_vec());
        assert_matches!(store.update(stale).await, Err(StoreError::Conflict { .. }));

        let stored = store.get(&updated.id).await.unwrap();
        assert_eq!(stored.get("k0s.crt"), Some(b"x".as_slice()));
        assert_eq!(store.update_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = MemoryRecordStore::new();
        let result = store.update(record(&[])).await;
        assert_matches!(result, Err(StoreError::NotFound { .. }));
    }
}
