//! Aurelia Bot
//!
//! Telegram chat-relay bot: forwards each message, with the user's recent
//! conversation, to the Perchance text API and relays the reply.
//!
//! # Architecture
//!
//! ```text
//! Telegram ──► Dispatcher ──► Responder ──► Perchance API
//!                 │              │
//!                 │              ├── ConversationStore (last 20 turns/user)
//!                 │              └── Prompt (persona + last 10 turns)
//!                 └── /start /reset /help
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod perchance;
pub mod prompt;
pub mod responder;
pub mod telegram;


pub use config::Config;
pub use conversation::{ConversationStore, ConversationTurn, Role, UserId, MAX_STORED_TURNS};
pub use error::{ConfigError, GenerationError};
pub use perchance::{CompletionBackend, PerchanceClient};
pub use prompt::Persona;
pub use responder::{Responder, API_FAILURE_REPLY, INTERNAL_ERROR_REPLY, PROMPT_CONTEXT_TURNS};
