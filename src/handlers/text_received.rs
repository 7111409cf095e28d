use std::sync::Arc;

use teloxide::prelude::*;

use crate::{
    errors::HandlerResult,
    router::{Event, Router},
    schema::{MyDialogue, State, update_dialogue},
};

pub async fn text_received(
    dialogue: MyDialogue,
    state: State,
    msg: Message,
    text: String,
    router: Arc<Router>,
) -> HandlerResult {
    let next = router.handle(msg.chat.id, &state, Event::Text(text)).await?;
    if next != state {
        update_dialogue(&dialogue, next).await?;
    }
    Ok(())
}
