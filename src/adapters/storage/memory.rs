use crate::domain::model::{InternalRecord, NewRecord, RecordId};
use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, SyncError};
use std::collections::BTreeMap;

/// Record store held entirely in memory. Writes take effect immediately.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: BTreeMap<RecordId, InternalRecord>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later records replace earlier ones with the same id.
    pub fn from_records(records: impl IntoIterator<Item = InternalRecord>) -> Self {
        let records: BTreeMap<RecordId, InternalRecord> =
            records.into_iter().map(|r| (r.id, r)).collect();
        let next_id = records.keys().next_back().map_or(0, |id| id.0);
        Self { records, next_id }
    }

    pub fn get(&self, id: RecordId) -> Option<&InternalRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &InternalRecord> {
        self.records.values()
    }
}

impl RecordStore for InMemoryStore {
    fn find_all(&self) -> Result<Vec<InternalRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn insert(&mut self, record: NewRecord) -> Result<InternalRecord> {
        self.next_id += 1;
        let record = record.into_record(RecordId(self.next_id));
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&mut self, record: &InternalRecord) -> Result<()> {
        match self.records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(SyncError::RecordNotFound { id: record.id.0 }),
        }
    }
}
