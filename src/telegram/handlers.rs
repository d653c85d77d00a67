use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use super::bot::BotContext;
use super::keyboards;
use super::session::parse_wallets;
use crate::analytics::{ProgressSink, WalletMetrics, WalletProcessor};
use crate::chain::types::UserId;
use crate::reporting::{format_wallet_result, generate_filename, write_csv_report, OutputFormat};

pub const WELCOME_TEXT: &str = "What can this bot do? Check ALL your Meteora metrics!";
pub const ASK_WALLETS_TEXT: &str = "Send me wallets separated by spaces";
pub const NO_WALLETS_TEXT: &str = "No valid wallet addresses found. Please try again.";
pub const START_OVER_TEXT: &str = "No wallets found. Please start over.";
pub const JOB_RUNNING_TEXT: &str =
    "Your previous analysis is still running. Please wait until it finishes.";
pub const HELP_TEXT: &str = "This bot analyzes Solana wallets for Meteora metrics.\n\n\
                             Commands:\n\
                             /start - Start using the bot\n\
                             /help - Show this help message\n\n\
                             To use the bot, click START and send wallet addresses separated by spaces.";

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "Start using the bot")]
    Start,
    #[command(description = "Show this help message")]
    Help,
}

pub fn found_wallets_text(count: usize) -> String {
    format!("Found {} wallet(s). Please select output format:", count)
}

pub fn processing_text(count: usize) -> String {
    format!("Processing {} wallet(s)... This may take some time.", count)
}

/// Progress message text of wallet `index` (0-based) out of `total`
pub fn progress_text(index: usize, total: usize, details: &str) -> String {
    let base = format!("Processing {}/{} wallets..", index + 1, total);
    if details.is_empty() {
        base
    } else {
        format!("{}\n{}", base, details)
    }
}

pub fn complete_text(count: usize) -> String {
    format!("Analysis complete for {} wallet(s)!", count)
}

/// Text that Telegram treats as a command, known to [`Command`] or not
pub fn is_command_text(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Messages that should be read as a wallet list
pub fn is_wallet_message(msg: Message) -> bool {
    msg.text().is_some_and(|text| !is_command_text(text))
}

pub async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME_TEXT)
                .reply_markup(keyboards::start_menu())
                .await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, HELP_TEXT).await?;
        }
    }
    Ok(())
}

pub async fn handle_wallets(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let wallets = parse_wallets(text);
    if wallets.is_empty() {
        bot.send_message(msg.chat.id, NO_WALLETS_TEXT).await?;
        return Ok(());
    }

    info!("Chat {} sent {} wallet(s)", msg.chat.id.0, wallets.len());
    let count = wallets.len();
    ctx.sessions.store_wallets(msg.chat.id.0, wallets);

    bot.send_message(msg.chat.id, found_wallets_text(count))
        .reply_markup(keyboards::format_menu())
        .await?;
    Ok(())
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    let chat = message.chat().id;
    let message_id = message.id();

    if data == keyboards::START_ANALYSIS {
        bot.edit_message_text(chat, message_id, ASK_WALLETS_TEXT).await?;
        return Ok(());
    }

    let Some(format) = keyboards::parse_format(data) else {
        debug!("Ignoring callback data {}", data);
        return Ok(());
    };

    let Some(wallets) = ctx.sessions.wallets(chat.0) else {
        bot.edit_message_text(chat, message_id, START_OVER_TEXT).await?;
        return Ok(());
    };

    let user: UserId = q.from.id.0;
    if !ctx.sessions.try_begin_job(user) {
        bot.send_message(chat, JOB_RUNNING_TEXT).await?;
        return Ok(());
    }

    let total = wallets.len();
    let started = async {
        bot.edit_message_text(chat, message_id, processing_text(total)).await?;
        bot.send_message(chat, progress_text(0, total, "")).await
    }
    .await;

    let progress = match started {
        Ok(progress) => progress,
        Err(e) => {
            ctx.sessions.finish_job(user);
            return Err(e);
        }
    };

    info!("Starting {:?} analysis of {} wallet(s) for user {}", format, total, user);
    tokio::spawn(run_job(bot, ctx, chat, user, wallets, format, progress.id));
    Ok(())
}

/// Edits the progress message of the running job
struct MessageProgress {
    bot: Bot,
    chat: ChatId,
    message_id: MessageId,
    index: usize,
    total: usize,
}

#[async_trait]
impl ProgressSink for MessageProgress {
    async fn report(&self, details: &str) {
        let text = progress_text(self.index, self.total, details);
        if let Err(e) = self.bot.edit_message_text(self.chat, self.message_id, text).await {
            // Telegram rejects edits that leave the text unchanged
            debug!("Failed to update progress message: {}", e);
        }
    }
}

async fn run_job(
    bot: Bot,
    ctx: Arc<BotContext>,
    chat: ChatId,
    user: UserId,
    wallets: Vec<String>,
    format: OutputFormat,
    progress_id: MessageId,
) {
    let total = wallets.len();
    let mut results: Vec<WalletMetrics> = Vec::with_capacity(total);

    for (index, wallet) in wallets.into_iter().enumerate() {
        let sink = MessageProgress {
            bot: bot.clone(),
            chat,
            message_id: progress_id,
            index,
            total,
        };
        sink.report("").await;

        let metrics = WalletProcessor::new(
            wallet,
            user,
            ctx.provider.clone(),
            ctx.blacklist.clone(),
            ctx.settings.clone(),
        )
        .with_progress(Arc::new(sink))
        .process()
        .await;
        results.push(metrics);
    }

    if let Err(e) = bot.delete_message(chat, progress_id).await {
        error!("Failed to delete progress message: {}", e);
    }

    if let Err(e) = deliver(&bot, &ctx, chat, &results, format).await {
        error!("Failed to deliver results to chat {}: {}", chat.0, e);
    }

    ctx.provider.release(user);
    if let Some(started) = ctx.sessions.finish_job(user) {
        info!(
            "Finished analysis of {} wallet(s) for user {} in {:?}",
            total,
            user,
            started.elapsed()
        );
    }
}

async fn deliver(
    bot: &Bot,
    ctx: &BotContext,
    chat: ChatId,
    results: &[WalletMetrics],
    format: OutputFormat,
) -> ResponseResult<()> {
    if format.includes_text() {
        for (i, metrics) in results.iter().enumerate() {
            bot.send_message(chat, format_wallet_result(i + 1, metrics)).await?;
        }
    }

    if format.includes_csv() {
        let path = generate_filename(&ctx.config.report.output_dir, Local::now().date_naive());
        match write_csv_report(results, &path) {
            Ok(()) => {
                bot.send_document(chat, InputFile::file(path)).await?;
            }
            Err(e) => warn!("Failed to write CSV: {}", e),
        }
    }

    bot.send_message(chat, complete_text(results.len())).await?;
    Ok(())
}
