//! Directory-backed document repository.
//!
//! # Storage Layout
//!
//! ```text
//! <dir>/
//!   <session-id>.json
//! ```
//!
//! Each document carries the record id, the payload blob as base64 and
//! the denormalized columns.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::Repository;
use crate::error::{Result, SessionStoreError};
use crate::session::{SessionId, SessionRecord};

const EXTENSION: &str = "json";

/// On-disk form of a [`SessionRecord`].
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "_id")]
    id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl Document {
    fn from_record(record: &SessionRecord) -> Self {
        Self {
            id: record.id.clone(),
            data: record.data.as_ref().map(|d| STANDARD.encode(d)),
            device_id: record.device_id.clone(),
            user_id: record.user_id.clone(),
        }
    }

    fn into_record(self) -> Result<SessionRecord> {
        let data = match self.data {
            Some(encoded) => Some(STANDARD.decode(encoded).map_err(|e| {
                SessionStoreError::Repository(format!("corrupt data for {}: {}", self.id, e))
            })?),
            None => None,
        };

        Ok(SessionRecord {
            id: self.id,
            data,
            device_id: self.device_id,
            user_id: self.user_id,
        })
    }
}

/// Stores each session record as a JSON document on disk.
///
/// Identifiers are restricted to the URL-safe alphabet, so they map to
/// file names directly.
#[derive(Debug, Clone)]
pub struct FileRepository {
    dir: PathBuf,
}

impl FileRepository {
    /// Open a repository rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Root directory of this repository.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }
}

#[async_trait]
impl Repository for FileRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let content = match tokio::fs::read_to_string(self.path_for(id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document: Document = serde_json::from_str(&content)?;
        if document.id != *id {
            return Err(SessionStoreError::Repository(format!(
                "document {} holds id {}",
                id, document.id
            )));
        }
        document.into_record().map(Some)
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(&Document::from_record(record))?;

        // Write to a sibling file first so readers never see a partial document
        let path = self.path_for(&record.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, record: &SessionRecord) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(&record.id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_ids(&self) -> Result<Vec<SessionId>> {
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match SessionId::parse(stem) {
                Ok(id) => ids.push(id),
                Err(_) => tracing::debug!(path = %path.display(), "skipping foreign file"),
            }
        }

        ids.sort();
        Ok(ids)
    }
}
