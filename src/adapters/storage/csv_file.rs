use crate::adapters::storage::memory::InMemoryStore;
use crate::domain::model::{InternalRecord, NewRecord, RecordId};
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct StoredRow {
    id: u64,
    member_id: Option<i64>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    active: bool,
}

impl From<StoredRow> for InternalRecord {
    fn from(row: StoredRow) -> Self {
        Self {
            id: RecordId(row.id),
            member_id: row.member_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            active: row.active,
        }
    }
}

impl From<&InternalRecord> for StoredRow {
    fn from(record: &InternalRecord) -> Self {
        Self {
            id: record.id.0,
            member_id: record.member_id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            active: record.active,
        }
    }
}

/// Record store kept in a CSV file.
///
/// Writes are staged in memory and reach the file only on `commit`, which
/// replaces the file through a temporary sibling. Empty cells load as absent
/// values, so a blank email does not survive a round trip.
#[derive(Debug, Clone)]
pub struct CsvFileStore {
    path: PathBuf,
    staged: InMemoryStore,
    dirty: bool,
}

impl CsvFileStore {
    /// A missing file opens as an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let staged = if path.exists() {
            let mut reader = csv::Reader::from_path(&path)?;
            let mut records = Vec::new();
            for row in reader.deserialize::<StoredRow>() {
                records.push(InternalRecord::from(row?));
            }
            tracing::debug!("Loaded {} records from {}", records.len(), path.display());
            InMemoryStore::from_records(records)
        } else {
            tracing::warn!("Store file {} does not exist, starting empty", path.display());
            InMemoryStore::new()
        };

        Ok(Self {
            path,
            staged,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_pending_writes(&self) -> bool {
        self.dirty
    }

    fn write_file(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let written = self
            .write_rows(&tmp_path)
            .and_then(|()| fs::rename(&tmp_path, &self.path).map_err(Into::into));
        if written.is_err() && tmp_path.exists() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                tracing::warn!("Could not remove {}: {}", tmp_path.display(), e);
            }
        }
        written
    }

    fn write_rows(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in self.staged.records() {
            writer.serialize(StoredRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl RecordStore for CsvFileStore {
    fn find_all(&self) -> Result<Vec<InternalRecord>> {
        self.staged.find_all()
    }

    fn insert(&mut self, record: NewRecord) -> Result<InternalRecord> {
        let record = self.staged.insert(record)?;
        self.dirty = true;
        Ok(record)
    }

    fn update(&mut self, record: &InternalRecord) -> Result<()> {
        self.staged.update(record)?;
        self.dirty = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.write_file()?;
        self.dirty = false;
        tracing::info!(
            "Saved {} records to {}",
            self.staged.len(),
            self.path.display()
        );
        Ok(())
    }
}
