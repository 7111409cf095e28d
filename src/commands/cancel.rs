use std::sync::Arc;

use teloxide::prelude::*;

use crate::{
    errors::HandlerResult,
    router::Router,
    schema::{MyDialogue, update_dialogue},
};

pub async fn cancel(dialogue: MyDialogue, msg: Message, router: Arc<Router>) -> HandlerResult {
    let next = router.cancel(msg.chat.id).await?;
    update_dialogue(&dialogue, next).await
}
