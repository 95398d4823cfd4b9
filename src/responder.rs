//! Response Generator
//!
//! Turns one user message into one reply string. Always returns text:
//! API failures become [`API_FAILURE_REPLY`], anything unexpected becomes
//! [`INTERNAL_ERROR_REPLY`].

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::conversation::{ConversationStore, Role, UserId};
use crate::error::GenerationError;
use crate::perchance::CompletionBackend;
use crate::prompt::{build_prompt, Persona};

/// Turns of history rendered into each prompt
pub const PROMPT_CONTEXT_TURNS: usize = 10;

/// Reply used when the text API fails
pub const API_FAILURE_REPLY: &str =
    "Oi! Desculpa, estou com um probleminha tecnico agora. Pode tentar de novo em alguns segundos? 😊";

/// Reply used when reply generation breaks unexpectedly
pub const INTERNAL_ERROR_REPLY: &str = "Ops! Algo deu errado. Tenta de novo? 😅";

/// Generates persona replies backed by a conversation store
pub struct Responder {
    store: Arc<ConversationStore>,
    backend: Arc<dyn CompletionBackend>,
    persona: Persona,
}

impl Responder {
    pub fn new(store: Arc<ConversationStore>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            store,
            backend,
            persona: Persona::default(),
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Record the message, ask the backend, record and return the reply
    pub async fn generate_reply(&self, user_id: UserId, message: &str) -> String {
        let _exchange = self.store.exchange_lock(user_id).await;

        match AssertUnwindSafe(self.exchange(user_id, message))
            .catch_unwind()
            .await
        {
            Ok(reply) => reply,
            Err(panic) => {
                error!(
                    "Erro: reply generation for user {} panicked: {}",
                    user_id,
                    panic_message(&*panic)
                );
                INTERNAL_ERROR_REPLY.to_string()
            }
        }
    }

    /// Empty the user's history once any in-flight reply has been recorded
    pub async fn reset(&self, user_id: UserId) {
        let _exchange = self.store.exchange_lock(user_id).await;
        self.store.reset(user_id);
    }

    async fn exchange(&self, user_id: UserId, message: &str) -> String {
        self.store.append(user_id, Role::User, message);

        let context = self.store.recent(user_id, PROMPT_CONTEXT_TURNS);
        let prompt = build_prompt(&self.persona, &context);
        debug!(
            "Prompt for user {}: {} context turns, {} chars",
            user_id,
            context.len(),
            prompt.len()
        );

        let reply = match self.backend.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback(user_id, &GenerationError::EmptyBody),
            Err(reason) => fallback(user_id, &reason),
        };

        self.store.append(user_id, Role::Assistant, reply.clone());
        reply
    }
}

fn fallback(user_id: UserId, reason: &GenerationError) -> String {
    info!("Fallback reply for user {}: {}", user_id, reason);
    API_FAILURE_REPLY.to_string()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
