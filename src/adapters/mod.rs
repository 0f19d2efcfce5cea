// Adapters layer: concrete implementations for external systems (roster files, record stores).

pub mod roster;
pub mod storage;

pub use roster::{RosterImport, RosterReader, SkippedRow};
pub use storage::{CsvFileStore, InMemoryStore};
