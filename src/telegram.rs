//! Telegram front end
//!
//! Routes `/start`, `/reset` and `/help`, relays every other text message
//! through the [`Responder`], and delivers the reply. Uses an explicit
//! Dispatcher with long polling.

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{ChatAction, ParseMode, Update},
};

use crate::config::Config;
use crate::conversation::{ConversationStore, UserId};
use crate::perchance::PerchanceClient;
use crate::responder::Responder;

/// Longest chunk sent in one Telegram message
pub const MAX_MESSAGE_CHARS: usize = 4000;

pub const WELCOME_TEXT: &str = "🌟 <b>Ola! Eu sou a Aurelia!</b> 🌟\n\n\
    Sou sua assistente virtual brasileira, pronta pra conversar!\n\n\
    📝 <b>Comandos:</b>\n\
    • Manda qualquer mensagem que eu respondo!\n\
    • /reset - Comeca conversa nova\n\
    • /help - Ver comandos\n\n\
    Bora conversar? 💬";

pub const RESET_TEXT: &str = "🔄 Conversa reiniciada! Vamos comecar de novo? 😊";

pub const HELP_TEXT: &str = "📚 <b>Comandos:</b>\n\n\
    /start - Inicia o bot\n\
    /reset - Limpa historico\n\
    /help - Mostra isso\n\n\
    💬 Pra conversar, so mandar mensagem!";

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Reset,
    Help,
    Unknown,
}

impl BotCommand {
    /// Parse a message; `None` when it is not a command
    ///
    /// Accepts `/cmd`, `/cmd@botname` and trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        Some(match name.as_str() {
            "start" => Self::Start,
            "reset" => Self::Reset,
            "help" => Self::Help,
            _ => Self::Unknown,
        })
    }
}

/// Text to deliver and how Telegram should render it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub html: bool,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
        }
    }

    fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: true,
        }
    }
}

/// Shared handler state
pub struct BotData {
    pub responder: Responder,
}

impl BotData {
    pub fn new(responder: Responder) -> Self {
        Self { responder }
    }
}

/// Run Telegram bot with explicit Dispatcher for reliable polling
pub async fn run_telegram_bot(config: Config) -> Result<()> {
    let backend = PerchanceClient::from_config(&config).context("Failed to build HTTP client")?;
    let responder = Responder::new(Arc::new(ConversationStore::new()), Arc::new(backend));
    let data = Arc::new(BotData::new(responder));

    let persona = data.responder.persona();
    tracing::info!("Persona: {} ({})", persona.name, persona.language);
    tracing::info!("Text API: {}", config.api_url);
    tracing::info!("Request timeout: {:?}", config.request_timeout);

    let bot = Bot::new(config.bot_token.clone());

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

    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(message_handler));

    tracing::info!("✅ Aurelia esta online!");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in message handler",
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
    if let Err(e) = handle_message(&bot, &msg, &data).await {
        tracing::error!("Error handling message in chat {}: {:#}", msg.chat.id, e);
    }

    Ok(())
}

async fn handle_message(bot: &Bot, msg: &Message, data: &BotData) -> Result<()> {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        tracing::debug!("Ignoring non-text message in chat {}", chat_id);
        return Ok(());
    };
    let user_id: UserId = msg
        .from
        .as_ref()
        .map(|u| u.id.0 as i64)
        .unwrap_or(chat_id.0);

    tracing::info!(
        "Message received: user={}, chat={}, len={}",
        user_id,
        chat_id,
        text.chars().count()
    );

    if BotCommand::parse(text).is_none() {
        if let Err(e) = bot.send_chat_action(chat_id, ChatAction::Typing).await {
            tracing::debug!("Typing indicator failed: {}", e);
        }
    }

    let reply = handle_text(data, user_id, text).await;
    send_reply(bot, chat_id, &reply).await
}

/// Decide the reply for one inbound text
pub async fn handle_text(data: &BotData, user_id: UserId, text: &str) -> Reply {
    match BotCommand::parse(text) {
        Some(BotCommand::Start) => {
            data.responder.reset(user_id).await;
            Reply::html(WELCOME_TEXT)
        }
        Some(BotCommand::Reset) => {
            data.responder.reset(user_id).await;
            Reply::plain(RESET_TEXT)
        }
        Some(BotCommand::Help) | Some(BotCommand::Unknown) => Reply::html(HELP_TEXT),
        None => Reply::plain(data.responder.generate_reply(user_id, text).await),
    }
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<()> {
    if reply.html {
        bot.send_message(chat_id, &reply.text)
            .parse_mode(ParseMode::Html)
            .await
            .context("Failed to send reply")?;
        return Ok(());
    }

    for chunk in split_message(&reply.text, MAX_MESSAGE_CHARS) {
        bot.send_message(chat_id, chunk)
            .await
            .context("Failed to send reply")?;
    }
    Ok(())
}

/// Split text into chunks of at most `max_chars` characters
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(c);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
