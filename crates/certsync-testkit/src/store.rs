//! Record store with scripted faults and interleavings
//!
//! Wraps a [`MemoryRecordStore`]. Each queued fault applies to the next call
//! of its operation only, which makes race outcomes deterministic.

use async_trait::async_trait;
use certsync_core::effects::{RecordStoreEffects, StoreError};
use certsync_core::{RecordId, SharedRecord};
use certsync_effects::MemoryRecordStore;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug)]
enum CreateFault {
    Fail(StoreError),
    CreateFirst(SharedRecord),
}

#[derive(Debug)]
enum UpdateFault {
    Fail(StoreError),
    UpdateFirst(BTreeMap<String, Vec<u8>>),
}

/// Fault-injecting record store
#[derive(Debug, Default)]
pub struct ScriptedRecordStore {
    inner: MemoryRecordStore,
    get_faults: Mutex<VecDeque<StoreError>>,
    create_faults: Mutex<VecDeque<CreateFault>>,
    update_faults: Mutex<VecDeque<UpdateFault>>,
}

impl ScriptedRecordStore {
    /// Wrap an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding and inspection
    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }

    /// The next `get` fails with `error`
    pub fn fail_next_get(&self, error: StoreError) {
        self.get_faults.lock().push_back(error);
    }

    /// The next `create` fails with `error`
    pub fn fail_next_create(&self, error: StoreError) {
        self.create_faults.lock().push_back(CreateFault::Fail(error));
    }

    /// The next `update` fails with `error`
    pub fn fail_next_update(&self, error: StoreError) {
        self.update_faults.lock().push_back(UpdateFault::Fail(error));
    }

    /// Another writer creates `record` just before the next `create`
    pub fn race_next_create(&self, record: SharedRecord) {
        self.create_faults
            .lock()
            .push_back(CreateFault::CreateFirst(record));
    }

    /// Another writer merges `entries` just before the next `update`
    pub fn race_next_update(&self, entries: BTreeMap<String, Vec<u8>>) {
        self.update_faults
            .lock()
            .push_back(UpdateFault::UpdateFirst(entries));
    }
}

#[async_trait]
impl RecordStoreEffects for ScriptedRecordStore {
    async fn get(&self, id: &RecordId) -> Result<SharedRecord, StoreError> {
        let fault = self.get_faults.lock().pop_front();
        if let Some(error) = fault {
            return Err(error);
        }
        self.inner.get(id).await
    }

    async fn create(&self, record: SharedRecord) -> Result<SharedRecord, StoreError> {
        let fault = self.create_faults.lock().pop_front();
        match fault {
            Some(CreateFault::Fail(error)) => return Err(error),
            Some(CreateFault::CreateFirst(competitor)) => {
                self.inner.create(competitor).await?;
            }
            None => {}
        }
        self.inner.create(record).await
    }

    async fn update(&self, record: SharedRecord) -> Result<SharedRecord, StoreError> {
        let fault = self.update_faults.lock().pop_front();
        match fault {
            Some(UpdateFault::Fail(error)) => return Err(error),
            Some(UpdateFault::UpdateFirst(entries)) => {
                let mut current = self.inner.get(&record.id).await?;
                current.data.get_or_insert_with(BTreeMap::new).extend(entries);
                self.inner.update(current).await?;
            }
            None => {}
        }
        self.inner.update(record).await
    }
}
