//! Append-only generation history, one JSON object per line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::{StoreError, StoreResult};

/// File name of the history log inside the data directory
pub const HISTORY_FILE: &str = "history.jsonl";

/// One completed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub voice_id: String,
    pub characters: usize,
    pub chunks: usize,
    pub bytes: usize,
    pub created_at: String,
}

impl HistoryEntry {
    pub fn new(
        user: Option<String>,
        voice_id: impl Into<String>,
        characters: usize,
        chunks: usize,
        bytes: usize,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user,
            voice_id: voice_id.into(),
            characters,
            chunks,
            bytes,
            created_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        }
    }
}

/// JSON-lines history file.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &HistoryEntry) -> StoreResult<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.append_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        file.write_all(&line)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.flush().await.map_err(|e| StoreError::io(&self.path, e))
    }

    /// The newest `limit` entries, oldest first.
    ///
    /// Lines that fail to parse (e.g. a torn final write) are skipped.
    pub async fn recent(&self, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let entries: Vec<HistoryEntry> = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable history line");
                    None
                }
            })
            .collect();

        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path());

        for n in 0..5 {
            log.append(&HistoryEntry::new(None, "henry", 100 * n, 1, 2000))
                .await
                .unwrap();
        }

        let recent = log.recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].characters, 200);
        assert_eq!(recent[2].characters, 400);

        let all = log.recent(100).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path().join("never-created"));
        assert!(log.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_torn_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path());
        let entry = HistoryEntry::new(Some("sara".into()), "sara", 12, 1, 4096);
        log.append(&entry).await.unwrap();

        let mut raw = std::fs::read_to_string(log.path()).unwrap();
        raw.push_str("{\"id\":\"trunc");
        std::fs::write(log.path(), raw).unwrap();

        assert_eq!(log.recent(10).await.unwrap(), vec![entry]);
    }
}
