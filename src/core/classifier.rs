use crate::core::differ::{diff_deactivate, diff_new, diff_update};
use crate::core::matcher::RecordMatcher;
use crate::domain::change::{Change, ChangeKind, ChangeSet};
use crate::domain::model::{ExternalRecord, InternalRecord};

/// Turns one imported batch and one store snapshot into the reviewable change set.
#[derive(Debug, Clone, Default)]
pub struct ChangeClassifier {
    matcher: RecordMatcher,
}

impl ChangeClassifier {
    pub fn new(matcher: RecordMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &RecordMatcher {
        &self.matcher
    }

    /// New and updated records come first, in roster order, followed by
    /// deactivations in snapshot order. Unchanged matches produce nothing.
    ///
    /// Every row is matched against the full snapshot, so two rows may claim the
    /// same stored record; each is diffed against the original snapshot.
    pub fn detect_changes(
        &self,
        external: &[ExternalRecord],
        internal: &[InternalRecord],
    ) -> ChangeSet {
        let mut changes = Vec::new();
        let mut matched = vec![false; internal.len()];
        let mut unchanged = 0usize;

        for incoming in external {
            match self.matcher.find_match(incoming, internal) {
                None => {
                    tracing::debug!("NEW {}", incoming.display_name());
                    changes.push(Change::new(
                        ChangeKind::New {
                            incoming: incoming.clone(),
                        },
                        diff_new(incoming),
                    ));
                }
                Some((index, existing)) => {
                    matched[index] = true;
                    let field_changes = diff_update(existing, incoming);
                    if field_changes.is_empty() {
                        unchanged += 1;
                        continue;
                    }
                    tracing::debug!(
                        "UPDATE record {} ({}): {}",
                        existing.id,
                        existing.display_name(),
                        field_changes.fields().collect::<Vec<_>>().join(", ")
                    );
                    changes.push(Change::new(
                        ChangeKind::Update {
                            existing: existing.clone(),
                            incoming: incoming.clone(),
                        },
                        field_changes,
                    ));
                }
            }
        }

        for (existing, _) in internal
            .iter()
            .zip(&matched)
            .filter(|(record, was_matched)| record.active && !**was_matched)
        {
            tracing::debug!("DEACTIVATE record {} ({})", existing.id, existing.display_name());
            changes.push(Change::new(
                ChangeKind::Deactivate {
                    existing: existing.clone(),
                },
                diff_deactivate(),
            ));
        }

        let change_set = ChangeSet::new(changes);
        let summary = change_set.summary();
        tracing::info!(
            "Reconciled {} roster rows against {} stored records: {} new, {} update, {} deactivate, {} unchanged",
            external.len(),
            internal.len(),
            summary.new,
            summary.update,
            summary.deactivate,
            unchanged
        );

        change_set
    }
}
