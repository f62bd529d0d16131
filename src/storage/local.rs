//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::MeetingWeek;
use crate::storage::ScheduleStorage;

/// Stores the schedule as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write bytes atomically (write to temp, then rename).
    ///
    /// The temp file is removed when any step fails.
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        if let Err(e) = Self::replace_with(&tmp, &self.path, bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Could not remove {}: {}", tmp.display(), cleanup);
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn replace_with(tmp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(tmp, target).await
    }
}

#[async_trait]
impl ScheduleStorage for LocalStorage {
    async fn write_schedule(&self, weeks: &[MeetingWeek]) -> Result<String> {
        let bytes = serde_json::to_vec_pretty(weeks)?;
        self.write_bytes(&bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(self.path.display().to_string())
    }

    async fn load_schedule(&self) -> Result<Option<Vec<MeetingWeek>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
