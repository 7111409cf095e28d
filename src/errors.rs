use std::{fmt, time::Duration};

/// Centralised error type for the bot
#[derive(Debug)]
pub enum BotError {
    /// yt-dlp could not fetch the link (bad or unsupported URL)
    Fetch(String),
    /// The image could not be decoded or encoded
    Encode(String),
    /// A format was picked before any photo was uploaded
    NoPendingImage,
    /// A collaborator call ran past its deadline
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    /// Filesystem errors
    FileSystemError(std::io::Error),
    /// Telegram API errors
    TelegramError(teloxide::RequestError),
    /// Failed to download a file from Telegram
    DownloadError(teloxide::DownloadError),
    /// Data parsing errors
    ParseError(String),
    /// Missing or malformed configuration
    Config(String),
    /// External command could not be run
    ExternalCommandError { command: String, stderr: String },
    /// Generic error with a description
    General(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::Fetch(msg) => write!(f, "Video fetch failed: {}", msg),
            BotError::Encode(msg) => write!(f, "Image encoding failed: {}", msg),
            BotError::NoPendingImage => write!(f, "No image uploaded"),
            BotError::Timeout { operation, after } => {
                write!(f, "{} timed out after {}s", operation, after.as_secs())
            }
            BotError::FileSystemError(e) => write!(f, "Filesystem error: {}", e),
            BotError::TelegramError(e) => write!(f, "Telegram API error: {}", e),
            BotError::DownloadError(e) => write!(f, "Telegram file download error: {}", e),
            BotError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            BotError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BotError::ExternalCommandError { command, stderr } => {
                write!(f, "Command {} failed: {}", command, stderr)
            }
            BotError::General(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::FileSystemError(e) => Some(e),
            BotError::TelegramError(e) => Some(e),
            BotError::DownloadError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::FileSystemError(err)
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

impl From<teloxide::DownloadError> for BotError {
    fn from(err: teloxide::DownloadError) -> Self {
        BotError::DownloadError(err)
    }
}

impl From<image::ImageError> for BotError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => BotError::FileSystemError(e),
            other => BotError::Encode(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::ParseError(format!("JSON parsing error: {}", err))
    }
}

impl From<tokio::task::JoinError> for BotError {
    fn from(err: tokio::task::JoinError) -> Self {
        BotError::General(format!("Background task failed: {}", err))
    }
}

impl BotError {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn external_command_error(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ExternalCommandError {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// Telegram refused the upload because the file exceeds the Bot API limit.
    pub fn is_entity_too_large(&self) -> bool {
        matches!(
            self,
            BotError::TelegramError(teloxide::RequestError::Api(
                teloxide::ApiError::RequestEntityTooLarge
            ))
        )
    }
}

/// Result of bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Result for handlers
pub type HandlerResult = BotResult<()>;
