use crate::domain::model::{ExternalRecord, InternalRecord};
use crate::utils::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Before/after of one field. An absent `old_value` means the field is being set
/// for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldChange {
    pub fn new(field: &str, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            field: field.to_string(),
            old_value,
            new_value,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let new_value = self.new_value.as_deref().unwrap_or("(none)");
        match self.old_value.as_deref() {
            None | Some("") => write!(f, "{}", new_value),
            Some(old_value) => write!(f, "{} → {}", old_value, new_value),
        }
    }
}

/// Field name to change mapping that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldChanges(Vec<FieldChange>);

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces an existing entry for the same field in place.
    pub fn insert(&mut self, change: FieldChange) {
        match self.0.iter_mut().find(|c| c.field == change.field) {
            Some(slot) => *slot = change,
            None => self.0.push(change),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.iter().find(|c| c.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.field.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldChange> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldChanges {
    type Item = &'a FieldChange;
    type IntoIter = std::slice::Iter<'a, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    New,
    Update,
    Deactivate,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::Update => write!(f, "UPDATE"),
            Self::Deactivate => write!(f, "DEACTIVATE"),
        }
    }
}

/// What a change does, with exactly the records that kind of change needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    New {
        incoming: ExternalRecord,
    },
    Update {
        existing: InternalRecord,
        incoming: ExternalRecord,
    },
    Deactivate {
        existing: InternalRecord,
    },
}

impl ChangeKind {
    pub fn change_type(&self) -> ChangeType {
        match self {
            Self::New { .. } => ChangeType::New,
            Self::Update { .. } => ChangeType::Update,
            Self::Deactivate { .. } => ChangeType::Deactivate,
        }
    }
}

/// A reviewable unit of a reconciliation run. `accepted` is the only field a
/// reviewer can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "ChangeDocument")]
pub struct Change {
    kind: ChangeKind,
    field_changes: FieldChanges,
    accepted: bool,
}

impl Change {
    pub(crate) fn new(kind: ChangeKind, field_changes: FieldChanges) -> Self {
        Self {
            kind,
            field_changes,
            accepted: true,
        }
    }

    pub fn kind(&self) -> &ChangeKind {
        &self.kind
    }

    pub fn change_type(&self) -> ChangeType {
        self.kind.change_type()
    }

    pub fn existing(&self) -> Option<&InternalRecord> {
        match &self.kind {
            ChangeKind::New { .. } => None,
            ChangeKind::Update { existing, .. } | ChangeKind::Deactivate { existing } => {
                Some(existing)
            }
        }
    }

    pub fn incoming(&self) -> Option<&ExternalRecord> {
        match &self.kind {
            ChangeKind::New { incoming } | ChangeKind::Update { incoming, .. } => Some(incoming),
            ChangeKind::Deactivate { .. } => None,
        }
    }

    pub fn field_changes(&self) -> &FieldChanges {
        &self.field_changes
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    /// Name shown to the reviewer: the incoming name when there is one.
    pub fn display_name(&self) -> String {
        match (self.incoming(), self.existing()) {
            (Some(incoming), _) => incoming.display_name(),
            (None, Some(existing)) => existing.display_name(),
            (None, None) => String::new(),
        }
    }
}

/// Flat serialized form of a [`Change`], as written to review files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDocument {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing: Option<InternalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming: Option<ExternalRecord>,
    pub field_changes: FieldChanges,
    pub accepted: bool,
}

impl From<Change> for ChangeDocument {
    fn from(change: Change) -> Self {
        let change_type = change.change_type();
        let (existing, incoming) = match change.kind {
            ChangeKind::New { incoming } => (None, Some(incoming)),
            ChangeKind::Update { existing, incoming } => (Some(existing), Some(incoming)),
            ChangeKind::Deactivate { existing } => (Some(existing), None),
        };
        Self {
            change_type,
            existing,
            incoming,
            field_changes: change.field_changes,
            accepted: change.accepted,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub total: usize,
    pub new: usize,
    pub update: usize,
    pub deactivate: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} change(s): {} new, {} update, {} deactivate ({} accepted, {} rejected)",
            self.total, self.new, self.update, self.deactivate, self.accepted, self.rejected
        )
    }
}

/// The batch produced by one reconciliation run, in classification order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Change> {
        self.changes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn accepted(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|c| c.accepted)
    }

    pub fn accept_all(&mut self) {
        self.changes.iter_mut().for_each(|c| c.accepted = true);
    }

    pub fn reject_all(&mut self) {
        self.changes.iter_mut().for_each(|c| c.accepted = false);
    }

    pub fn set_accepted(&mut self, index: usize, accepted: bool) -> Result<()> {
        let len = self.changes.len();
        let change = self
            .changes
            .get_mut(index)
            .ok_or(SyncError::ChangeIndexOutOfRange { index, len })?;
        change.accepted = accepted;
        Ok(())
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary {
            total: self.changes.len(),
            ..ChangeSummary::default()
        };
        for change in &self.changes {
            match change.change_type() {
                ChangeType::New => summary.new += 1,
                ChangeType::Update => summary.update += 1,
                ChangeType::Deactivate => summary.deactivate += 1,
            }
            if change.accepted {
                summary.accepted += 1;
            } else {
                summary.rejected += 1;
            }
        }
        summary
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
