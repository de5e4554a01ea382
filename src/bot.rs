//! Telegram bot startup and shared state.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use teloxide::dispatching::{HandlerExt, ShutdownToken, UpdateFilterExt, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::sync::RwLock;

use crate::callbacks::callback_endpoint;
use crate::chatbot::message_endpoint;
use crate::commands::{Command, command_endpoint};
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::history::ConversationStore;
use crate::models::ModelRegistry;
use crate::preferences::PreferenceStore;

/// State shared by every update handler.
pub struct Data {
    conversations: RwLock<ConversationStore>,
    preferences: RwLock<PreferenceStore>,
    completion_client: CompletionClient,
    registry: Arc<ModelRegistry>,
    system_prompt: String,
    context_window: usize,
}

impl Data {
    #[must_use]
    pub fn new(
        registry: Arc<ModelRegistry>,
        completion_client: CompletionClient,
        system_prompt: String,
        context_window: usize,
    ) -> Self {
        Self {
            conversations: RwLock::new(ConversationStore::new()),
            preferences: RwLock::new(PreferenceStore::new(Arc::clone(&registry))),
            completion_client,
            registry,
            system_prompt,
            context_window,
        }
    }

    pub fn conversations(&self) -> &RwLock<ConversationStore> {
        &self.conversations
    }

    pub fn preferences(&self) -> &RwLock<PreferenceStore> {
        &self.preferences
    }

    pub fn completion_client(&self) -> &CompletionClient {
        &self.completion_client
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }
}

/// Run the Telegram bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let registry = match config.default_model.as_deref() {
        Some(key) => ModelRegistry::builtin().with_default(key)?,
        None => ModelRegistry::builtin(),
    };
    info!(
        "Loaded {} models, default '{}'",
        registry.len(),
        registry.default_key()
    );

    let registry = Arc::new(registry);

    debug!("Initializing completion client");
    let completion_client = CompletionClient::new(
        config.fireworks_api_key.clone(),
        &config.fireworks_base_url,
        Arc::clone(&registry),
    )?;

    if completion_client.test_connection().await {
        info!("Completion API connection test succeeded");
    } else {
        warn!("Completion API connection test failed, starting anyway");
    }

    let data = Arc::new(Data::new(
        registry,
        completion_client,
        config.system_prompt.clone(),
        config.context_window,
    ));

    let bot = Bot::new(config.telegram_token);

    debug!("Verifying bot token");
    let me = bot.get_me().await?;
    info!(
        "Bot authenticated as @{} (ID: {})",
        me.user.username.as_deref().unwrap_or("unknown"),
        me.user.id
    );

    debug!("Registering command list");
    bot.set_my_commands(Command::bot_commands()).await?;

    info!("Starting dispatcher with long polling");
    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![data])
        .default_handler(|update| async move {
            debug!("Unhandled update: {update:?}");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in update handler",
        ))
        .enable_ctrlc_handler()
        .build();

    tokio::spawn(shutdown_on(terminate_signal(), dispatcher.shutdown_token()));
    dispatcher.dispatch().await;

    info!("Dispatcher stopped");
    Ok(())
}

/// Routes commands, plain text and inline keyboard presses.
fn schema() -> UpdateHandler<BotError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(command_endpoint),
                )
                .branch(dptree::endpoint(message_endpoint)),
        )
        .branch(Update::filter_callback_query().endpoint(callback_endpoint))
}

/// Stop the dispatcher gracefully once `signal` resolves.
async fn shutdown_on<S>(signal: S, token: ShutdownToken)
where
    S: Future<Output = ()>,
{
    signal.await;
    info!("Termination signal received, shutting down");
    match token.shutdown() {
        Ok(done) => done.await,
        Err(e) => warn!("Dispatcher was not running: {e}"),
    }
}

#[cfg(unix)]
async fn terminate_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

// Ctrl-C is already handled by the dispatcher
#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await;
}

/// Await an update handler and log how long it took.
pub(crate) async fn log_processing<F>(kind: &str, handler: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let start = Instant::now();
    let result = handler.await;
    let elapsed = start.elapsed().as_millis();

    match &result {
        Ok(()) => info!("{kind} processed in {elapsed}ms"),
        Err(e) => error!("{kind} failed after {elapsed}ms: {e}"),
    }

    result
}
