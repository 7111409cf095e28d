use std::sync::Arc;

use teloxide::prelude::*;

use crate::{
    errors::HandlerResult,
    router::Router,
    schema::{MyDialogue, update_dialogue},
};

pub async fn start(dialogue: MyDialogue, msg: Message, router: Arc<Router>) -> HandlerResult {
    let next = router.start(msg.chat.id).await?;
    update_dialogue(&dialogue, next).await
}
