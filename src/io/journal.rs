//! Prediction journal persistence.
//!
//! The journal is a single small JSON document that is read and rewritten in
//! full on every change. Concurrent writers are not coordinated.

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Journal, JournalEntry, JournalPatch, NewJournalEntry};
use crate::error::AppError;
use crate::io::dataset::{read_json_opt, write_json_atomic};

/// Storage for journal entries.
///
/// `id` is assigned on `create` and never changes afterwards.
pub trait JournalStore {
    fn create(&self, entry: NewJournalEntry) -> Result<JournalEntry, AppError>;
    fn get(&self, id: &str) -> Result<Option<JournalEntry>, AppError>;
    fn get_by_event_id(&self, event_id: &str) -> Result<Option<JournalEntry>, AppError>;
    fn list(&self) -> Result<Vec<JournalEntry>, AppError>;
    fn update(&self, id: &str, patch: JournalPatch) -> Result<Option<JournalEntry>, AppError>;
    fn delete(&self, id: &str) -> Result<bool, AppError>;
}

/// `journal.json` backed store.
#[derive(Debug, Clone)]
pub struct JsonJournal {
    path: PathBuf,
}

impl JsonJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<Journal, AppError> {
        Ok(read_json_opt(&self.path)?.unwrap_or_default())
    }

    fn write(&self, journal: &Journal) -> Result<(), AppError> {
        write_json_atomic(&self.path, journal)
    }
}

impl JournalStore for JsonJournal {
    fn create(&self, entry: NewJournalEntry) -> Result<JournalEntry, AppError> {
        let mut journal = self.read()?;
        let entry = entry.into_entry(Uuid::new_v4().to_string(), Utc::now());
        journal.entries.push(entry.clone());
        self.write(&journal)?;
        tracing::debug!(id = %entry.id, event_id = %entry.event_id, "journal entry created");
        Ok(entry)
    }

    fn get(&self, id: &str) -> Result<Option<JournalEntry>, AppError> {
        Ok(self.read()?.entries.into_iter().find(|e| e.id == id))
    }

    fn get_by_event_id(&self, event_id: &str) -> Result<Option<JournalEntry>, AppError> {
        Ok(self.read()?.entries.into_iter().find(|e| e.event_id == event_id))
    }

    fn list(&self) -> Result<Vec<JournalEntry>, AppError> {
        Ok(self.read()?.entries)
    }

    fn update(&self, id: &str, patch: JournalPatch) -> Result<Option<JournalEntry>, AppError> {
        let mut journal = self.read()?;
        let Some(entry) = journal.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        patch.apply(entry);
        let updated = entry.clone();
        self.write(&journal)?;
        tracing::debug!(id, "journal entry updated");
        Ok(Some(updated))
    }

    fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut journal = self.read()?;
        let before = journal.entries.len();
        journal.entries.retain(|e| e.id != id);
        if journal.entries.len() == before {
            return Ok(false);
        }
        self.write(&journal)?;
        tracing::debug!(id, "journal entry deleted");
        Ok(true)
    }
}
