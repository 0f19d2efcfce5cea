use crate::core::differ::{diff_deactivate, diff_new, diff_update};
use crate::domain::change::{Change, ChangeDocument, ChangeKind, ChangeSet, ChangeSummary, ChangeType};
use crate::utils::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A detected batch written to disk so acceptance can be edited before `apply`.
///
/// A batch belongs to the store it was detected against and is applied at
/// most once; `applied_at` is stamped into the file after a successful apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBatch {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    pub summary: ChangeSummary,
    pub changes: Vec<ChangeDocument>,
}

impl ReviewBatch {
    pub fn from_changes(source: &str, store: &str, changes: &ChangeSet) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            store: store.to_string(),
            applied_at: None,
            summary: changes.summary(),
            changes: changes.iter().cloned().map(ChangeDocument::from).collect(),
        }
    }

    /// Refuses a batch that was already applied or was detected against a
    /// different store.
    pub fn ensure_applicable(&self, store: &str) -> Result<()> {
        if let Some(applied_at) = self.applied_at {
            return Err(SyncError::BatchAlreadyApplied {
                applied_at: applied_at.to_rfc3339(),
            });
        }
        if !same_path(&self.store, store) {
            return Err(SyncError::BatchStoreMismatch {
                expected: self.store.clone(),
                actual: store.to_string(),
            });
        }
        Ok(())
    }

    pub fn mark_applied(&mut self) {
        self.applied_at = Some(Utc::now());
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!("Wrote review batch with {} changes to {}", self.changes.len(), path.display());
        Ok(())
    }

    /// Rebuilds the change set. Every change must still describe exactly the
    /// diff its records imply; a hand-edited diff is rejected.
    pub fn into_change_set(self) -> Result<ChangeSet> {
        let changes = self
            .changes
            .into_iter()
            .enumerate()
            .map(|(index, document)| change_from_document(index, document))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChangeSet::new(changes))
    }
}

fn same_path(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => without_cur_dir(a) == without_cur_dir(b),
    }
}

fn without_cur_dir(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

pub fn change_from_document(index: usize, document: ChangeDocument) -> Result<Change> {
    let invalid = |reason: &str| SyncError::InvalidChange {
        index,
        reason: reason.to_string(),
    };

    let (kind, expected) = match (document.change_type, document.existing, document.incoming) {
        (ChangeType::New, None, Some(incoming)) => {
            let expected = diff_new(&incoming);
            (ChangeKind::New { incoming }, expected)
        }
        (ChangeType::Update, Some(existing), Some(incoming)) => {
            let expected = diff_update(&existing, &incoming);
            if expected.is_empty() {
                return Err(invalid("update has no differing fields"));
            }
            (ChangeKind::Update { existing, incoming }, expected)
        }
        (ChangeType::Deactivate, Some(existing), None) => {
            if !existing.active {
                return Err(invalid("record to deactivate is already inactive"));
            }
            (ChangeKind::Deactivate { existing }, diff_deactivate())
        }
        (change_type, _, _) => {
            return Err(invalid(&format!(
                "{} change has the wrong combination of existing and incoming records",
                change_type
            )))
        }
    };

    if document.field_changes != expected {
        return Err(invalid("field changes do not match the records"));
    }

    let mut change = Change::new(kind, expected);
    change.set_accepted(document.accepted);
    Ok(change)
}

/// Plain-text listing for the terminal, one line per change.
pub fn render_table(changes: &ChangeSet) -> String {
    let mut lines = vec![format!(
        "{:>4}  {:<10}  {:<6}  {:<28}  {}",
        "#", "TYPE", "ACCEPT", "PERSON", "CHANGES"
    )];

    for (index, change) in changes.iter().enumerate() {
        let fields = change
            .field_changes()
            .iter()
            .map(|fc| format!("{}: {}", fc.field, fc))
            .collect::<Vec<_>>()
            .join("; ");
        let person = match change.existing() {
            Some(existing) => format!("{} [#{}]", change.display_name(), existing.id),
            None => change.display_name(),
        };
        lines.push(format!(
            "{:>4}  {:<10}  {:<6}  {:<28}  {}",
            index,
            change.change_type().to_string(),
            if change.is_accepted() { "yes" } else { "no" },
            person,
            fields
        ));
    }

    lines.join("\n")
}
