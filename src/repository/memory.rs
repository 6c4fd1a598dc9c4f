//! In-process document repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::Repository;
use crate::error::{Result, SessionStoreError};
use crate::session::{SessionId, SessionRecord};

/// Thread-safe in-memory storage for session records.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: RwLock<HashMap<SessionId, SessionRecord>>,
    read_only: AtomicBool,
}

impl MemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail (or succeed again).
    ///
    /// Lets callers exercise the unsaved-session path without a real
    /// storage outage.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Relaxed);
    }

    /// Get the number of stored records.
    pub fn count(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(records.len())
    }

    /// Check if a record is stored under `id`.
    pub fn contains(&self, id: &SessionId) -> Result<bool> {
        let records = self
            .records
            .read()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(records.contains_key(id))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        if self.read_only.load(Ordering::Relaxed) {
            return Err(SessionStoreError::Repository(format!(
                "repository is read-only, cannot save {}",
                record.id
            )));
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, record: &SessionRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        records.remove(&record.id);
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<SessionId>> {
        let records = self
            .records
            .read()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(records.keys().cloned().collect())
    }
}
