mod commands;
mod config;
mod convert;
mod errors;
mod handlers;
mod menu;
mod router;
mod schema;
mod storage;
mod texts;
mod transport;
mod utils;
mod video;

use std::sync::Arc;

use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::{
    config::Config,
    convert::RasterConverter,
    router::{Router, RouterSettings},
    schema::{State, schema},
    storage::TransientStorage,
    transport::TelegramTransport,
    video::YtDlp,
};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Starting media bot (work dir: {}, routing: {:?})...",
        config.work_dir.display(),
        config.routing
    );

    let bot = Bot::new(&config.token);
    let storage = TransientStorage::new(&config.work_dir);

    let router = Arc::new(Router::new(
        Arc::new(TelegramTransport::new(bot.clone())),
        Arc::new(YtDlp::new(&config.ytdlp_path, config.max_video_size_mb)),
        Arc::new(RasterConverter::new(config.jpeg_quality)),
        storage.clone(),
        RouterSettings {
            policy: config.routing,
            fetch_timeout: config.fetch_timeout,
            encode_timeout: config.encode_timeout,
        },
    ));

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![InMemStorage::<State>::new(), router])
        .default_handler(|upd| async move {
            log::debug!("Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher stopped, clearing {}", storage.root().display());
    if let Err(e) = storage.clear().await {
        log::error!("Failed to clear work directory: {}", e);
    }
}
