use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::{
    errors::{BotError, BotResult},
    router::RoutingPolicy,
};

const DEFAULT_WORK_DIR: &str = "downloads";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 600;
const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 60;
/// Bot API refuses uploads above 50MB.
const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 50;
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub work_dir: PathBuf,
    pub ytdlp_path: String,
    pub fetch_timeout: Duration,
    pub encode_timeout: Duration,
    pub max_video_size_mb: u64,
    pub jpeg_quality: u8,
    pub routing: RoutingPolicy,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> BotResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> BotResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("API_TOKEN")
            .or_else(|| lookup("TELOXIDE_TOKEN"))
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BotError::config("API_TOKEN (or TELOXIDE_TOKEN) must be set"))?;

        let jpeg_quality = parse_or(&lookup, "JPEG_QUALITY", DEFAULT_JPEG_QUALITY)?;
        if !(1..=100).contains(&jpeg_quality) {
            return Err(BotError::config(format!(
                "JPEG_QUALITY must be between 1 and 100, got {}",
                jpeg_quality
            )));
        }

        let routing = if parse_or(&lookup, "STRICT_ROUTING", false)? {
            RoutingPolicy::Strict
        } else {
            RoutingPolicy::Permissive
        };

        Ok(Self {
            token,
            work_dir: lookup("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            ytdlp_path: lookup("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string()),
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            encode_timeout: Duration::from_secs(parse_or(
                &lookup,
                "ENCODE_TIMEOUT_SECS",
                DEFAULT_ENCODE_TIMEOUT_SECS,
            )?),
            max_video_size_mb: parse_or(&lookup, "MAX_VIDEO_SIZE_MB", DEFAULT_MAX_VIDEO_SIZE_MB)?,
            jpeg_quality,
            routing,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> BotResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| BotError::config(format!("invalid {}={:?}: {}", key, raw, e))),
    }
}
