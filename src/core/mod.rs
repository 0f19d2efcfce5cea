pub mod applier;
pub mod classifier;
pub mod differ;
pub mod engine;
pub mod matcher;

pub use crate::domain::change::{Change, ChangeKind, ChangeSet, ChangeType, FieldChange};
pub use crate::domain::model::{ExternalRecord, InternalRecord, NewRecord, RecordId};
pub use crate::domain::ports::RecordStore;
pub use crate::utils::error::Result;
