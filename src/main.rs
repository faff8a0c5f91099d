mod carousel;
mod config;
mod content;
mod handlers;
mod quiz;
mod quotes;
mod render;

use std::sync::Arc;

use dotenv::dotenv;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
};

use carousel::QuoteBoard;
use config::Config;
use content::source::HttpViewSource;
use handlers::State;
use quiz::attempt_log::AttemptLogger;
use quiz::session::{MemorySessionStore, QuizSessions};

type DialogueStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() {
    // .env is optional, plain environment variables work as well
    dotenv().ok();
    pretty_env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            return;
        }
    };

    log::info!("Starting MEME Lab bot...");
    let bot = Bot::from_env();

    log::info!("Opening dialogue storage at {}", config.dialogue_db);
    let storage: DialogueStorage = match SqliteStorage::open(&config.dialogue_db, Json).await {
        Ok(storage) => storage.erase(),
        Err(err) => {
            log::error!("Could not open dialogue storage: {}", err);
            return;
        }
    };

    let client = reqwest::Client::new();

    match &config.content_api_url {
        Some(url) => log::info!("Loading lab content from {}", url),
        None => log::warn!("CONTENT_API_URL is not set, showing placeholder content"),
    }
    let source = HttpViewSource::new(client.clone(), config.content_api_url.clone());
    let content = Arc::new(content::loader::load_all(&source, config.fetch_timeout).await);

    let board = Arc::new(QuoteBoard::new(
        quotes::build_slides(&content.quotes),
        config.quote_rotation,
    ));
    let sessions = QuizSessions::new(
        Arc::new(MemorySessionStore::default()),
        config.quiz_draw_count,
    );
    let logger = AttemptLogger::new(client, config.quiz_log_url.clone());
    let config = Arc::new(config);

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(handlers::start))
            .branch(dptree::case![State::Menu].endpoint(handlers::menu))
            .branch(dptree::case![State::MemberSearch].endpoint(handlers::member_search))
            .branch(dptree::case![State::Quotes].endpoint(handlers::quotes))
            .branch(dptree::case![State::Quiz { attempt }].endpoint(handlers::quiz)),
    )
    .dependencies(dptree::deps![storage, config, content, board, sessions, logger])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}
