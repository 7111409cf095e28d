use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use teloxide::types::ChatId;
use tokio::fs;

use crate::errors::BotResult;

/// File name under which an uploaded photo waits for a format choice.
pub const PENDING_IMAGE_NAME: &str = "input_image";

/// Root of all scratch space. Each chat gets its own directory below it so a
/// purge in one chat never touches another chat's files.
#[derive(Debug, Clone)]
pub struct TransientStorage {
    root: PathBuf,
}

impl TransientStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn for_chat(&self, chat_id: ChatId) -> ChatStorage {
        ChatStorage {
            dir: self.root.join(format!("chat{}", chat_id)),
        }
    }

    /// Removes the whole scratch tree. Used on shutdown.
    pub async fn clear(&self) -> BotResult<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingImage {
    pub path: PathBuf,
    pub uploaded_at: DateTime<Utc>,
}

/// Scratch directory of a single chat.
#[derive(Debug, Clone)]
pub struct ChatStorage {
    dir: PathBuf,
}

impl ChatStorage {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn prepare(&self) -> BotResult<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes `bytes` under the final component of `logical_name`.
    pub async fn store(&self, bytes: &[u8], logical_name: &str) -> BotResult<PathBuf> {
        let name = Path::new(logical_name)
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| PENDING_IMAGE_NAME.into());

        self.prepare().await?;
        let path = self.dir.join(name);
        fs::write(&path, bytes).await?;
        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    pub async fn pending_image(&self) -> Option<PendingImage> {
        let path = self.dir.join(PENDING_IMAGE_NAME);
        let metadata = fs::metadata(&path).await.ok()?;
        if !metadata.is_file() {
            return None;
        }

        let uploaded_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Some(PendingImage { path, uploaded_at })
    }

    /// Removes every regular file in this chat's directory.
    pub async fn purge_all(&self) -> BotResult<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            log::debug!("Purged {} file(s) from {}", removed, self.dir.display());
        }
        Ok(removed)
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        let Ok(mut entries) = fs::read_dir(&self.dir).await else {
            return true;
        };
        matches!(entries.next_entry().await, Ok(None))
    }
}
