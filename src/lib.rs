pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CsvFileStore, InMemoryStore, RosterReader};
pub use config::SyncConfig;
pub use crate::core::applier::{ApplyReport, ChangeApplier};
pub use crate::core::classifier::ChangeClassifier;
pub use crate::core::engine::Reconciler;
pub use crate::core::matcher::{MatchStrategy, RecordMatcher};
pub use domain::change::{Change, ChangeKind, ChangeSet, ChangeSummary, ChangeType, FieldChange};
pub use domain::model::{ExternalRecord, InternalRecord, NewRecord, RecordId};
pub use domain::ports::RecordStore;
pub use utils::error::{Result, SyncError};
