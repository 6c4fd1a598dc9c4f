//! Document repositories holding session records.
//!
//! The session store only needs key-addressed find, save and delete. Two
//! implementations are provided:
//!
//! - [`MemoryRepository`]: a locked in-process document map
//! - [`FileRepository`]: one JSON document per record in a directory

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{SessionId, SessionRecord};

pub use file::FileRepository;
pub use memory::MemoryRepository;

/// Key-addressed storage for session records.
///
/// Each call is expected to be atomic for a single record. Nothing beyond
/// that is assumed: concurrent writers to the same id race and the last
/// save wins.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Look up a record by id.
    ///
    /// Returns `Ok(None)` if no record is stored under `id`.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<SessionRecord>>;

    /// Insert or replace a record.
    async fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Remove a record.
    ///
    /// Returns `Ok(())` even if the record was never stored.
    async fn delete(&self, record: &SessionRecord) -> Result<()>;

    /// List the ids of all stored records.
    async fn list_ids(&self) -> Result<Vec<SessionId>>;
}
