use std::sync::Arc;

use teloxide::{net::Download, prelude::*, types::PhotoSize};

use crate::{
    errors::{BotError, BotResult, HandlerResult},
    router::{Event, Router},
    schema::{MyDialogue, State, update_dialogue},
    utils::largest_photo,
};

pub async fn photo_received(
    bot: Bot,
    dialogue: MyDialogue,
    state: State,
    msg: Message,
    photos: Vec<PhotoSize>,
    router: Arc<Router>,
) -> HandlerResult {
    let bytes = match download_photo(&bot, &photos).await {
        Ok(bytes) => bytes,
        Err(e) => return router.report_unexpected(msg.chat.id, &e).await,
    };

    let next = router.handle(msg.chat.id, &state, Event::Photo(bytes)).await?;
    if next != state {
        update_dialogue(&dialogue, next).await?;
    }
    Ok(())
}

async fn download_photo(bot: &Bot, photos: &[PhotoSize]) -> BotResult<Vec<u8>> {
    let photo = largest_photo(photos).ok_or_else(|| BotError::general("Photo without sizes"))?;
    let file = bot.get_file(photo.file.id.clone()).await?;

    log::debug!(
        "Downloading photo {} ({}x{}, {} bytes)",
        file.path,
        photo.width,
        photo.height,
        file.size
    );

    let mut bytes = Vec::with_capacity(file.size as usize);
    bot.download_file(&file.path, &mut bytes).await?;
    Ok(bytes)
}
