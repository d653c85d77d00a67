//! Bot construction and the update dispatcher.

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use super::handlers::{
    handle_callback, handle_command, handle_wallets, is_wallet_message, Command,
};
use super::session::SessionStore;
use crate::analytics::{Blacklist, ProcessorSettings};
use crate::chain::types::SourceProvider;
use crate::config::Config;

/// Everything the handlers share, injected into the dispatcher
pub struct BotContext {
    pub config: Arc<Config>,
    pub provider: Arc<dyn SourceProvider>,
    pub blacklist: Arc<Blacklist>,
    pub settings: ProcessorSettings,
    pub sessions: SessionStore,
}

impl BotContext {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn SourceProvider>,
        blacklist: Arc<Blacklist>,
    ) -> Self {
        let settings = ProcessorSettings::from_config(&config);
        Self {
            config,
            provider,
            blacklist,
            settings,
            sessions: SessionStore::new(),
        }
    }
}

/// Poll Telegram until the process receives Ctrl-C
pub async fn run(ctx: Arc<BotContext>) -> Result<()> {
    let token = ctx
        .config
        .telegram
        .token
        .clone()
        .context("TELEGRAM_TOKEN is required to run the bot")?;

    let bot = Bot::new(token);
    let me = bot.get_me().await.context("Failed to validate bot token")?;
    info!(
        "Bot initialized: @{} (ID: {})",
        me.username.as_deref().unwrap_or("unknown"),
        me.id
    );

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            Update::filter_message()
                .filter(is_wallet_message)
                .endpoint(handle_wallets),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
