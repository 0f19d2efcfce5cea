use crate::domain::model::{InternalRecord, NewRecord};
use crate::utils::error::Result;

/// Persistent home of the internal record set.
pub trait RecordStore {
    /// All records, in any order; `Reconciler::detect` sorts them by id.
    fn find_all(&self) -> Result<Vec<InternalRecord>>;

    /// Persists a new record and returns it with its assigned id.
    fn insert(&mut self, record: NewRecord) -> Result<InternalRecord>;

    /// Overwrites the stored record with the same id.
    fn update(&mut self, record: &InternalRecord) -> Result<()>;

    /// Makes staged writes durable. Stores that write through need not override this.
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}
