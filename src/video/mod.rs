pub mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::BotResult;

pub use ytdlp::YtDlp;

/// A downloaded video sitting in a chat's scratch directory.
#[derive(Debug, Clone)]
pub struct FetchedVideo {
    pub path: PathBuf,
    pub title: String,
}

/// Resolves a link and downloads its media into `dest`.
///
/// Fails with [`BotError::Fetch`](crate::errors::BotError::Fetch) when the link
/// is broken or unsupported.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> BotResult<FetchedVideo>;
}
