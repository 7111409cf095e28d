//! Menu state machine: turns each inbound event into exactly one action,
//! performs it and returns the chat's next state.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use strum::IntoStaticStr;
use teloxide::types::ChatId;

use crate::{
    convert::ImageConverter,
    errors::{BotError, BotResult, HandlerResult},
    menu::{ImageFormat, Menu, MenuOption, Platform},
    schema::State,
    storage::{ChatStorage, PENDING_IMAGE_NAME, TransientStorage},
    texts,
    transport::Transport,
    utils::is_video_link,
    video::VideoFetcher,
};

/// How much the current state restricts which events are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingPolicy {
    /// Match on content alone: a link downloads and a label acts in any state.
    #[default]
    Permissive,
    /// Honour labels and links only in the state whose menu offers them.
    /// Photos and "Back" are accepted everywhere.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Text(String),
    Photo(Vec<u8>),
}

#[derive(IntoStaticStr, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowMainMenu,
    ShowPlatformMenu,
    PromptForLink(Platform),
    Download(String),
    ShowFormatMenu,
    StoreImage(Vec<u8>),
    Convert(ImageFormat),
}

impl MenuOption {
    /// The one place labels are tied to behaviour.
    pub fn action(self) -> Action {
        match self {
            MenuOption::DownloadVideo => Action::ShowPlatformMenu,
            MenuOption::ConvertImage => Action::ShowFormatMenu,
            MenuOption::YouTube => Action::PromptForLink(Platform::YouTube),
            MenuOption::TikTok => Action::PromptForLink(Platform::TikTok),
            MenuOption::Jpg => Action::Convert(ImageFormat::Jpg),
            MenuOption::Png => Action::Convert(ImageFormat::Png),
            MenuOption::Pdf => Action::Convert(ImageFormat::Pdf),
            MenuOption::Back => Action::ShowMainMenu,
        }
    }
}

/// Picks the action for an event, or `None` when the event is ignored.
pub fn classify(policy: RoutingPolicy, state: &State, event: Event) -> Option<Action> {
    let action = match event {
        Event::Photo(bytes) => return Some(Action::StoreImage(bytes)),
        Event::Text(text) => match MenuOption::from_label(&text) {
            Some(option) => option.action(),
            None if is_video_link(&text) => Action::Download(text.trim().to_string()),
            None => return None,
        },
    };

    if policy == RoutingPolicy::Permissive || allowed_in(state, &action) {
        Some(action)
    } else {
        None
    }
}

fn allowed_in(state: &State, action: &Action) -> bool {
    match action {
        Action::ShowMainMenu | Action::StoreImage(_) => true,
        Action::ShowPlatformMenu | Action::ShowFormatMenu => matches!(state, State::Main),
        Action::PromptForLink(_) | Action::Download(_) => {
            matches!(state, State::AwaitingVideoLink { .. })
        }
        Action::Convert(_) => matches!(state, State::AwaitingImageFormatChoice),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RouterSettings {
    pub policy: RoutingPolicy,
    pub fetch_timeout: Duration,
    pub encode_timeout: Duration,
}

pub struct Router {
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn VideoFetcher>,
    converter: Arc<dyn ImageConverter>,
    storage: TransientStorage,
    settings: RouterSettings,
}

impl Router {
    pub fn new(
        transport: Arc<dyn Transport>,
        fetcher: Arc<dyn VideoFetcher>,
        converter: Arc<dyn ImageConverter>,
        storage: TransientStorage,
        settings: RouterSettings,
    ) -> Self {
        Self {
            transport,
            fetcher,
            converter,
            storage,
            settings,
        }
    }

    /// Handles one event. Only transport failures come back as errors; every
    /// other failure has already been reported to the user.
    pub async fn handle(&self, chat_id: ChatId, state: &State, event: Event) -> BotResult<State> {
        let Some(action) = classify(self.settings.policy, state, event) else {
            log::debug!("Chat {}: ignoring event in state {:?}", chat_id, state);
            return Ok(state.clone());
        };

        let name: &'static str = (&action).into();
        log::info!("Chat {}: {} (state {:?})", chat_id, name, state);
        self.perform(chat_id, state, action).await
    }

    async fn perform(&self, chat_id: ChatId, state: &State, action: Action) -> BotResult<State> {
        match action {
            Action::ShowMainMenu => {
                self.transport
                    .send_text(chat_id, texts::BACK_TO_MAIN, Some(Menu::Main))
                    .await?;
                Ok(State::Main)
            }
            Action::ShowPlatformMenu => {
                self.transport
                    .send_text(chat_id, texts::SELECT_PLATFORM, Some(Menu::VideoPlatform))
                    .await?;
                Ok(State::AwaitingVideoLink { platform: None })
            }
            Action::PromptForLink(platform) => {
                self.transport
                    .send_text(chat_id, &texts::ask_for_link(platform), None)
                    .await?;
                Ok(State::AwaitingVideoLink {
                    platform: Some(platform),
                })
            }
            Action::Download(url) => {
                if let State::AwaitingVideoLink {
                    platform: Some(platform),
                } = state
                {
                    log::info!("Chat {}: fetching {} link", chat_id, platform);
                }
                self.download(chat_id, &url).await?;
                Ok(State::Main)
            }
            Action::ShowFormatMenu => {
                self.transport
                    .send_text(chat_id, texts::SELECT_FORMAT, Some(Menu::ImageFormat))
                    .await?;
                Ok(State::AwaitingImageFormatChoice)
            }
            Action::StoreImage(bytes) => {
                if self.store_image(chat_id, &bytes).await? {
                    Ok(State::AwaitingImageFormatChoice)
                } else {
                    Ok(state.clone())
                }
            }
            Action::Convert(format) => {
                self.convert_image(chat_id, format).await?;
                Ok(State::Main)
            }
        }
    }

    /// `/start`: greet and show the main menu.
    pub async fn start(&self, chat_id: ChatId) -> BotResult<State> {
        self.transport
            .send_text(chat_id, texts::WELCOME, Some(Menu::Main))
            .await?;
        Ok(State::Main)
    }

    /// `/cancel`: drop whatever the chat has uploaded and go back to the main menu.
    pub async fn cancel(&self, chat_id: ChatId) -> BotResult<State> {
        purge(chat_id, &self.storage.for_chat(chat_id)).await;
        self.transport
            .send_text(chat_id, texts::CANCELLED, Some(Menu::Main))
            .await?;
        Ok(State::Main)
    }

    /// Reports a failure that happened before an event could be built.
    pub async fn report_unexpected(&self, chat_id: ChatId, err: &BotError) -> HandlerResult {
        log::error!("Chat {}: {}", chat_id, err);
        self.transport
            .send_text(chat_id, texts::UNEXPECTED, None)
            .await
    }

    async fn download(&self, chat_id: ChatId, url: &str) -> HandlerResult {
        self.transport
            .send_text(chat_id, texts::DOWNLOADING, None)
            .await?;

        let storage = self.storage.for_chat(chat_id);
        let result = self.fetch_and_send(chat_id, &storage, url).await;
        purge(chat_id, &storage).await;

        let Err(err) = result else {
            return Ok(());
        };

        let reply = match &err {
            BotError::Fetch(reason) => {
                log::warn!("Chat {}: fetch failed for {}: {}", chat_id, url, reason);
                texts::DOWNLOAD_FAILED
            }
            BotError::Timeout { .. } => {
                log::warn!("Chat {}: {}", chat_id, err);
                texts::DOWNLOAD_TIMED_OUT
            }
            _ if err.is_entity_too_large() => {
                log::warn!("Chat {}: video from {} is too large to send", chat_id, url);
                texts::VIDEO_TOO_LARGE
            }
            _ => {
                log::error!("Chat {}: download of {} failed: {}", chat_id, url, err);
                texts::UNEXPECTED
            }
        };
        self.transport.send_text(chat_id, reply, None).await
    }

    async fn fetch_and_send(
        &self,
        chat_id: ChatId,
        storage: &ChatStorage,
        url: &str,
    ) -> HandlerResult {
        storage.prepare().await?;

        let timeout = self.settings.fetch_timeout;
        let video = tokio::time::timeout(timeout, self.fetcher.fetch(url, storage.dir()))
            .await
            .map_err(|_| BotError::timeout("video fetch", timeout))??;

        if !storage.exists(&video.path).await {
            return Err(BotError::fetch(format!(
                "yt-dlp reported {} but no such file exists",
                video.path.display()
            )));
        }

        self.transport
            .send_video(chat_id, &video.path, Some(&video.title))
            .await
    }

    /// Returns `false` when the image could not be kept.
    async fn store_image(&self, chat_id: ChatId, bytes: &[u8]) -> BotResult<bool> {
        let storage = self.storage.for_chat(chat_id);

        // a fresh upload replaces anything left from earlier
        let stored = match storage.purge_all().await {
            Ok(_) => storage.store(bytes, PENDING_IMAGE_NAME).await,
            Err(e) => Err(e),
        };

        if let Err(e) = stored {
            self.report_unexpected(chat_id, &e).await?;
            return Ok(false);
        }

        self.transport
            .send_text(chat_id, texts::IMAGE_UPLOADED, Some(Menu::ImageFormat))
            .await?;
        Ok(true)
    }

    async fn convert_image(&self, chat_id: ChatId, format: ImageFormat) -> HandlerResult {
        let storage = self.storage.for_chat(chat_id);

        let Some(pending) = storage.pending_image().await else {
            log::info!("Chat {}: {}", chat_id, BotError::NoPendingImage);
            return self.transport.send_text(chat_id, texts::NO_IMAGE, None).await;
        };

        log::info!(
            "Chat {}: converting image uploaded {}s ago to {}",
            chat_id,
            (Utc::now() - pending.uploaded_at).num_seconds(),
            format
        );

        let result = async {
            let output = self
                .converter
                .convert(&pending.path, format, self.settings.encode_timeout)
                .await?;

            self.transport.send_document(chat_id, &output).await
        }
        .await;
        purge(chat_id, &storage).await;

        if let Err(err) = result {
            match err {
                BotError::Encode(_) => log::warn!("Chat {}: {}", chat_id, err),
                _ => log::error!("Chat {}: conversion failed: {}", chat_id, err),
            }
            self.transport
                .send_text(chat_id, texts::CONVERT_FAILED, None)
                .await?;
        }
        Ok(())
    }
}

async fn purge(chat_id: ChatId, storage: &ChatStorage) {
    if let Err(e) = storage.purge_all().await {
        log::error!("Chat {}: failed to purge storage: {}", chat_id, e);
    }
}
