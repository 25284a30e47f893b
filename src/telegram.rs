//! Telegram transport
//!
//! Long-polling teloxide dispatcher. Messages and button presses are
//! handed to [`Handlers`]; the returned [`Reply`] is turned into Telegram
//! requests here. A failure while handling one update is logged and never
//! stops the dispatcher.

use anyhow::Result;
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{ChatAction, InputFile, ParseMode, Update},
};

use crate::config::Config;
use crate::dispatcher::{route, Handlers, Route};
use crate::error::GENERIC_ERROR_MESSAGE;
use crate::metrics::SystemMonitor;
use crate::telegram_ui::{split_chunks, Reply, MAX_TEXT_CHARS};

/// Shared, read-only handler state
struct BotData {
    handlers: Handlers,
}

/// Run Telegram bot with explicit Dispatcher for reliable polling
pub async fn run_telegram_bot(config: Config, monitor: SystemMonitor) -> Result<()> {
    tracing::info!("===========================================");
    tracing::info!("  {} - Starting...", config.display_name);
    tracing::info!("===========================================");
    tracing::info!("Gemini model: {}", config.gemini_model);
    tracing::info!("Movie API: {}", config.movie_api_url);

    let bot = Bot::new(config.telegram_token.clone());

    // Verify bot token by calling getMe
    tracing::info!("Verifying bot token...");
    match bot.get_me().await {
        Ok(me) => {
            tracing::info!(
                "Bot authenticated: @{} (ID: {})",
                me.username.as_deref().unwrap_or("unknown"),
                me.id
            );
        }
        Err(e) => {
            tracing::error!("Failed to authenticate bot: {}", e);
            anyhow::bail!("Bot authentication failed: {}", e);
        }
    }

    // Delete any existing webhook to ensure polling works
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let handler_data = Arc::new(BotData {
        handlers: Handlers::from_config(&config, monitor),
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler));

    tracing::info!("Starting dispatcher with long polling...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![handler_data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::warn!("Dispatcher stopped");
    Ok(())
}

/// Message handler endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    let user_id = msg.from.as_ref().map(|u| u.id.0).unwrap_or(0);
    let text_preview = msg
        .text()
        .unwrap_or("<non-text>")
        .chars()
        .take(50)
        .collect::<String>();

    tracing::info!(
        ">>> Message received: user={}, chat={}, text={:?}",
        user_id,
        msg.chat.id.0,
        text_preview
    );

    if let Err(e) = handle_message(&bot, &msg, &data).await {
        tracing::error!("Error handling message: {}", e);
    }

    Ok(())
}

async fn handle_message(bot: &Bot, msg: &Message, data: &BotData) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let sender = msg.from.as_ref().map(|u| u.full_name());

    let route = route(text);
    if matches!(route, Route::AiRelay(_)) {
        if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
            tracing::debug!("Typing indicator failed: {}", e);
        }
    }

    if let Some(reply) = data.handlers.dispatch(route, sender.as_deref()).await {
        send_reply(bot, msg.chat.id, reply).await?;
    }
    Ok(())
}

/// Callback query handler for inline keyboard buttons
async fn callback_handler(
    bot: Bot,
    query: CallbackQuery,
    data: Arc<BotData>,
) -> ResponseResult<()> {
    // Stop the client-side spinner first; the reply can take a while.
    // Stale queries cannot be answered but still get a reply.
    if let Err(e) = bot.answer_callback_query(&query.id).await {
        tracing::warn!("Failed to answer callback query: {}", e);
    }

    let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) else {
        tracing::debug!("Callback without message: {:?}", query.data);
        return Ok(());
    };

    let reply = match &query.data {
        Some(callback_data) => {
            tracing::info!("Callback query: user={}, data={}", query.from.id.0, callback_data);
            data.handlers.handle_callback(callback_data).await
        }
        None => Reply::plain(GENERIC_ERROR_MESSAGE),
    };

    if let Err(e) = send_reply(&bot, chat_id, reply).await {
        tracing::error!("Error handling callback: {}", e);
    }

    Ok(())
}

/// Send a reply. Photos fall back to their caption as text when Telegram
/// cannot send the poster.
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<()> {
    match reply {
        Reply::Text { text, html: false, keyboard: None } => {
            send_long_message(bot, chat_id, &text).await?;
        }
        Reply::Text { text, html, keyboard } => {
            let mut req = bot.send_message(chat_id, &text);
            if html {
                req = req.parse_mode(ParseMode::Html);
            }
            if let Some(markup) = keyboard {
                req = req.reply_markup(markup);
            }
            req.await?;
        }
        Reply::Photo { url, caption, keyboard } => {
            let photo = match reqwest::Url::parse(&url) {
                Ok(parsed) => InputFile::url(parsed),
                Err(e) => {
                    tracing::warn!("Invalid poster URL {:?}: {}", url, e);
                    let mut req = bot.send_message(chat_id, &caption).parse_mode(ParseMode::Html);
                    if let Some(markup) = keyboard {
                        req = req.reply_markup(markup);
                    }
                    req.await?;
                    return Ok(());
                }
            };

            let mut req = bot
                .send_photo(chat_id, photo)
                .caption(&caption)
                .parse_mode(ParseMode::Html);
            if let Some(markup) = keyboard.clone() {
                req = req.reply_markup(markup);
            }

            // Telegram cannot always fetch remote posters
            if let Err(e) = req.await {
                tracing::warn!("Photo send failed ({}), sending caption as text", e);
                let mut req = bot.send_message(chat_id, &caption).parse_mode(ParseMode::Html);
                if let Some(markup) = keyboard {
                    req = req.reply_markup(markup);
                }
                req.await?;
            }
        }
    }
    Ok(())
}

/// Send plain text, splitting past Telegram's message size limit
async fn send_long_message(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bot.send_message(chat_id, "(no response)").await?;
        return Ok(());
    }

    for chunk in split_chunks(text, MAX_TEXT_CHARS) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}
