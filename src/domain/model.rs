use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identity of an internal record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the imported roster. Identity is its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRecord {
    pub member_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl ExternalRecord {
    pub fn new(
        member_id: Option<i64>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Option<&str>,
    ) -> Self {
        Self {
            member_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.map(str::to_string),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A person as stored by the club. Mutated only through the applier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalRecord {
    pub id: RecordId,
    pub member_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub active: bool,
}

impl InternalRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Overwrites the four roster-owned fields; `id` and `active` are kept.
    pub fn overwrite_from(&mut self, incoming: &ExternalRecord) {
        self.first_name = incoming.first_name.clone();
        self.last_name = incoming.last_name.clone();
        self.email = incoming.email.clone();
        self.member_id = incoming.member_id;
    }
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub member_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub active: bool,
}

impl NewRecord {
    pub fn into_record(self, id: RecordId) -> InternalRecord {
        InternalRecord {
            id,
            member_id: self.member_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            active: self.active,
        }
    }
}

impl From<&ExternalRecord> for NewRecord {
    fn from(incoming: &ExternalRecord) -> Self {
        Self {
            member_id: incoming.member_id,
            first_name: incoming.first_name.clone(),
            last_name: incoming.last_name.clone(),
            email: incoming.email.clone(),
            active: true,
        }
    }
}
