use crate::core::applier::{ApplyReport, ChangeApplier};
use crate::core::classifier::ChangeClassifier;
use crate::core::matcher::RecordMatcher;
use crate::domain::change::ChangeSet;
use crate::domain::model::ExternalRecord;
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;

/// Runs detect and apply against one store.
///
/// The store is committed only when every accepted change was written, so a
/// store that stages its writes sees a failed batch as if it never ran.
pub struct Reconciler<S: RecordStore> {
    store: S,
    classifier: ChangeClassifier,
    applier: ChangeApplier,
}

impl<S: RecordStore> Reconciler<S> {
    pub fn new(store: S, classifier: ChangeClassifier) -> Self {
        Self {
            store,
            classifier,
            applier: ChangeApplier::new(),
        }
    }

    pub fn with_matcher(store: S, matcher: RecordMatcher) -> Self {
        Self::new(store, ChangeClassifier::new(matcher))
    }

    /// Classifies against the store's records in ascending id order, whatever
    /// order the store returns them in, so ambiguous matches resolve the same
    /// way for every store.
    pub fn detect(&self, external: &[ExternalRecord]) -> Result<ChangeSet> {
        tracing::info!("Loading stored records...");
        let mut internal = self.store.find_all()?;
        internal.sort_by_key(|record| record.id);
        tracing::info!("Loaded {} stored records", internal.len());

        Ok(self.classifier.detect_changes(external, &internal))
    }

    pub fn apply(&mut self, changes: &ChangeSet) -> Result<ApplyReport> {
        let summary = changes.summary();
        tracing::info!(
            "Applying {} accepted of {} proposed changes",
            summary.accepted,
            summary.total
        );

        let report = self.applier.apply(&mut self.store, changes)?;
        self.store.commit()?;
        tracing::debug!("Store committed");

        Ok(report)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: RecordStore + Default> Default for Reconciler<S> {
    fn default() -> Self {
        Self::new(S::default(), ChangeClassifier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::MatchStrategy;
    use crate::domain::change::ChangeType;
    use crate::domain::model::{InternalRecord, NewRecord, RecordId};
    use crate::utils::error::SyncError;

    /// Hands out its records newest first.
    struct ReversedStore {
        records: Vec<InternalRecord>,
    }

    impl RecordStore for ReversedStore {
        fn find_all(&self) -> Result<Vec<InternalRecord>> {
            Ok(self.records.iter().rev().cloned().collect())
        }

        fn insert(&mut self, _record: NewRecord) -> Result<InternalRecord> {
            Err(SyncError::StoreError {
                message: "read only".to_string(),
            })
        }

        fn update(&mut self, _record: &InternalRecord) -> Result<()> {
            Err(SyncError::StoreError {
                message: "read only".to_string(),
            })
        }
    }

    fn person(id: u64) -> InternalRecord {
        InternalRecord {
            id: RecordId(id),
            member_id: None,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: None,
            active: true,
        }
    }

    #[test]
    fn test_lowest_id_wins_regardless_of_store_order() {
        let engine = Reconciler::with_matcher(
            ReversedStore {
                records: vec![person(1), person(2)],
            },
            RecordMatcher::new(vec![MatchStrategy::Name]),
        );

        let changes = engine
            .detect(&[ExternalRecord::new(None, "John", "Doe", Some("j@x.com"))])
            .unwrap();

        let update = changes
            .iter()
            .find(|c| c.change_type() == ChangeType::Update)
            .unwrap();
        assert_eq!(update.existing().unwrap().id, RecordId(1));
        let deactivate = changes
            .iter()
            .find(|c| c.change_type() == ChangeType::Deactivate)
            .unwrap();
        assert_eq!(deactivate.existing().unwrap().id, RecordId(2));
    }
}
