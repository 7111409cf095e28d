use teloxide::{
    dispatching::{
        UpdateHandler,
        dialogue::{self, InMemStorage},
    },
    prelude::*,
    utils::command::BotCommands,
};

use crate::{
    commands::*,
    errors::BotError,
    handlers::{photo_received, text_received},
    menu::Platform,
};

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Which menu a chat is currently looking at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Main,
    AwaitingVideoLink {
        platform: Option<Platform>,
    },
    AwaitingImageFormatChoice,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Show the main menu
    Start,
    /// Drop the uploaded image and go back to the main menu
    Cancel,
}

pub fn schema() -> UpdateHandler<BotError> {
    use dptree::case;

    dialogue::enter::<Update, InMemStorage<State>, State, _>().branch(
        Update::filter_message()
            .branch(
                teloxide::filter_command::<Command, _>()
                    .branch(case![Command::Start].endpoint(start))
                    .branch(case![Command::Cancel].endpoint(cancel)),
            )
            .branch(Message::filter_text().endpoint(text_received))
            .branch(Message::filter_photo().endpoint(photo_received)),
    )
}

pub(crate) async fn update_dialogue(dialogue: &MyDialogue, state: State) -> Result<(), BotError> {
    dialogue
        .update(state)
        .await
        .map_err(|e| BotError::general(format!("Failed to update dialogue: {}", e)))
}
