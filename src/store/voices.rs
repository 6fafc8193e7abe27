//! Registry of cloned voices, persisted as a pretty-printed JSON array.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};

/// File name of the registry inside the data directory
pub const VOICES_FILE: &str = "voices.json";

/// A cloned voice as recorded after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    pub created_by: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl VoiceRecord {
    /// A record stamped with the current UTC time.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        language: Option<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language,
            created_by: created_by.into(),
            created_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        }
    }
}

/// JSON-file voice registry.
///
/// Reads go to disk every time so edits made by other processes show up;
/// writes are serialized through a mutex and land via a temp file rename.
#[derive(Debug)]
pub struct VoiceRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl VoiceRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Registry stored as `voices.json` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(VOICES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order; a missing file is an empty registry.
    pub async fn list(&self) -> StoreResult<Vec<VoiceRecord>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn find(&self, id: &str) -> StoreResult<Option<VoiceRecord>> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    /// Append a record unless one with the same id exists.
    ///
    /// Returns `true` when the record was added.
    pub async fn record(&self, record: VoiceRecord) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.list().await?;
        if records.iter().any(|r| r.id == record.id) {
            tracing::debug!(voice_id = %record.id, "Voice already registered");
            return Ok(false);
        }

        tracing::info!(voice_id = %record.id, name = %record.name, "Registering voice");
        records.push(record);
        self.write_all(&records).await?;
        Ok(true)
    }

    async fn write_all(&self, records: &[VoiceRecord]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }
}
