use std::path::Path;

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatAction, InputFile, KeyboardButton, KeyboardMarkup, ParseMode},
};

use crate::{errors::HandlerResult, menu::Menu};

/// Telegram caps media captions at 1024 characters.
const MAX_CAPTION_CHARS: usize = 1024;

/// Outbound side of the chat.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str, menu: Option<Menu>) -> HandlerResult;

    async fn send_video(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> HandlerResult;

    async fn send_document(&self, chat_id: ChatId, path: &Path) -> HandlerResult;
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

pub fn keyboard(menu: Menu) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = menu
        .rows()
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|option| KeyboardButton::new(option.to_string()))
                .collect()
        })
        .collect();

    KeyboardMarkup::new(rows).resize_keyboard()
}

fn truncate_caption(caption: &str) -> String {
    caption.chars().take(MAX_CAPTION_CHARS).collect()
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str, menu: Option<Menu>) -> HandlerResult {
        let request = self
            .bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html);

        match menu {
            Some(menu) => request.reply_markup(keyboard(menu)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_video(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> HandlerResult {
        self.bot
            .send_chat_action(chat_id, ChatAction::UploadVideo)
            .await?;

        let request = self.bot.send_video(chat_id, InputFile::file(path));
        match caption {
            Some(caption) => request.caption(truncate_caption(caption)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path) -> HandlerResult {
        self.bot
            .send_chat_action(chat_id, ChatAction::UploadDocument)
            .await?;
        self.bot
            .send_document(chat_id, InputFile::file(path))
            .await?;
        Ok(())
    }
}
