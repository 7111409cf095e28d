use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;
use tokio::process;

use super::{FetchedVideo, VideoFetcher};
use crate::errors::{BotError, BotResult};

/// Best single file, preferring mp4 so Telegram can play it inline.
const FORMAT_SELECTOR: &str = "best[ext=mp4]/best";

/// Printed once the file sits at its final path.
const PRINT_TEMPLATE: &str = "after_move:%(.{title,filepath})j";

#[derive(Debug, Deserialize)]
struct YtDlpOutput {
    title: Option<String>,
    filepath: String,
}

/// Fetches media by running the `yt-dlp` binary.
pub struct YtDlp {
    binary: String,
    max_filesize_mb: u64,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>, max_filesize_mb: u64) -> Self {
        Self {
            binary: binary.into(),
            max_filesize_mb,
        }
    }

    fn build_command(&self, url: &str, dest: &Path) -> process::Command {
        let file_id = uuid::Uuid::new_v4().simple().to_string();
        let output_template = dest.join(format!("video_{}.%(ext)s", &file_id[..8]));

        let mut cmd = process::Command::new(&self.binary);
        cmd.arg("--no-playlist")
            .args(["--socket-timeout", "5", "--retries", "3"])
            .args(["-f", FORMAT_SELECTOR])
            .args(["--max-filesize", &format!("{}M", self.max_filesize_mb)])
            .arg("--no-simulate")
            .arg("-o")
            .arg(output_template)
            .args(["--print", PRINT_TEMPLATE])
            .arg(url)
            // a timed-out fetch drops the future and must take the child with it
            .kill_on_drop(true);
        cmd
    }
}

fn parse_output(stdout: &str) -> BotResult<FetchedVideo> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| {
            BotError::fetch("yt-dlp produced no file, it may exceed the size limit")
        })?;

    let output: YtDlpOutput = serde_json::from_str(line)?;
    let path = PathBuf::from(output.filepath);
    let title = output
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    Ok(FetchedVideo { path, title })
}

#[async_trait]
impl VideoFetcher for YtDlp {
    async fn fetch(&self, url: &str, dest: &Path) -> BotResult<FetchedVideo> {
        info!("Starting download: {} into {}", url, dest.display());

        let output = self
            .build_command(url, dest)
            .output()
            .await
            .map_err(|e| BotError::external_command_error(&self.binary, e.to_string()))?;

        info!("yt-dlp exit code: {:?}", output.status.code());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("yt-dlp failed: {}", stderr);
            return Err(BotError::fetch(stderr));
        }

        let fetched = parse_output(&String::from_utf8_lossy(&output.stdout))?;
        info!("Download successful: {}", fetched.path.display());
        Ok(fetched)
    }
}
