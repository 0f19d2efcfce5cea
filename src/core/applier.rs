use crate::domain::change::{Change, ChangeKind};
use crate::domain::model::NewRecord;
use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, SyncError};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Inserts and updates written, across all change types.
    pub applied: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deactivated: usize,
    pub skipped: usize,
}

/// Writes the accepted part of a change batch to a store.
///
/// Changes are applied in order without re-checking them against the current
/// store contents. The first failed write stops the batch; the error carries
/// how many changes were written before it. Nothing is committed here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeApplier;

impl ChangeApplier {
    pub fn new() -> Self {
        Self
    }

    pub fn apply<'a, S, I>(&self, store: &mut S, changes: I) -> Result<ApplyReport>
    where
        S: RecordStore + ?Sized,
        I: IntoIterator<Item = &'a Change>,
    {
        let mut report = ApplyReport::default();

        for (index, change) in changes.into_iter().enumerate() {
            if !change.is_accepted() {
                report.skipped += 1;
                continue;
            }

            if let Err(source) = Self::apply_one(store, change, &mut report) {
                tracing::error!(
                    "Failed to apply {} change #{} ({}): {}",
                    change.change_type(),
                    index,
                    change.display_name(),
                    source
                );
                return Err(SyncError::ApplyAborted {
                    applied: report.applied,
                    index,
                    source: Box::new(source),
                });
            }
            report.applied += 1;
        }

        tracing::info!(
            "Applied {} change(s): {} inserted, {} updated, {} deactivated, {} skipped",
            report.applied,
            report.inserted,
            report.updated,
            report.deactivated,
            report.skipped
        );
        Ok(report)
    }

    fn apply_one<S>(store: &mut S, change: &Change, report: &mut ApplyReport) -> Result<()>
    where
        S: RecordStore + ?Sized,
    {
        match change.kind() {
            ChangeKind::New { incoming } => {
                let record = store.insert(NewRecord::from(incoming))?;
                tracing::debug!("Inserted record {} ({})", record.id, record.display_name());
                report.inserted += 1;
            }
            ChangeKind::Update { existing, incoming } => {
                let mut record = existing.clone();
                record.overwrite_from(incoming);
                store.update(&record)?;
                tracing::debug!("Updated record {} ({})", record.id, record.display_name());
                report.updated += 1;
            }
            ChangeKind::Deactivate { existing } => {
                let mut record = existing.clone();
                record.active = false;
                store.update(&record)?;
                tracing::debug!("Deactivated record {} ({})", record.id, record.display_name());
                report.deactivated += 1;
            }
        }
        Ok(())
    }
}
