//! Conversation Store
//!
//! Keeps the most recent message turns per user, in memory only.
//! Used to build prompt context; nothing here survives a restart.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Platform-supplied user identifier (Telegram user id)
pub type UserId = i64;

/// Maximum turns kept per user (rolling window)
pub const MAX_STORED_TURNS: usize = 20;

/// Who spoke a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Capitalized label used when rendering history into a prompt
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Per-user state: the turn window plus the guard serializing whole exchanges
struct UserSlot {
    turns: Mutex<VecDeque<ConversationTurn>>,
    exchange: Arc<tokio::sync::Mutex<()>>,
}

impl UserSlot {
    fn new() -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            exchange: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// In-memory conversation store keyed by user
///
/// The map lock is only taken to find or insert a user's slot; each history
/// has its own mutex, so users never wait on each other. No lock is held
/// across an `.await`.
pub struct ConversationStore {
    users: RwLock<HashMap<UserId, Arc<UserSlot>>>,
    max_turns: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create a store with the default window of [`MAX_STORED_TURNS`]
    pub fn new() -> Self {
        Self::with_capacity(MAX_STORED_TURNS)
    }

    /// Create a store keeping at most `max_turns` per user (minimum 1)
    pub fn with_capacity(max_turns: usize) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            max_turns: max_turns.max(1),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    fn slot(&self, user_id: UserId) -> Arc<UserSlot> {
        if let Some(slot) = self.users.read().get(&user_id) {
            return Arc::clone(slot);
        }

        let mut users = self.users.write();
        Arc::clone(
            users
                .entry(user_id)
                .or_insert_with(|| Arc::new(UserSlot::new())),
        )
    }

    /// Snapshot of the user's history, creating an empty one on first contact
    pub fn get_or_create(&self, user_id: UserId) -> Vec<ConversationTurn> {
        self.slot(user_id).turns.lock().iter().cloned().collect()
    }

    /// Append a turn, evicting the oldest ones beyond the window
    pub fn append(&self, user_id: UserId, role: Role, content: impl Into<String>) {
        let slot = self.slot(user_id);
        let mut turns = slot.turns.lock();
        turns.push_back(ConversationTurn::new(role, content));

        let mut evicted = 0;
        while turns.len() > self.max_turns {
            turns.pop_front();
            evicted += 1;
        }

        debug!(
            "Added {} turn for user {} (len={}, evicted={})",
            role,
            user_id,
            turns.len(),
            evicted
        );
    }

    /// Empty the user's history
    pub fn reset(&self, user_id: UserId) {
        let slot = self.slot(user_id);
        let mut turns = slot.turns.lock();
        let dropped = turns.len();
        turns.clear();
        debug!("Reset conversation for user {} ({} turns dropped)", user_id, dropped);
    }

    /// The last `n` turns in arrival order
    pub fn recent(&self, user_id: UserId, n: usize) -> Vec<ConversationTurn> {
        let slot = self.slot(user_id);
        let turns = slot.turns.lock();
        let skip = turns.len().saturating_sub(n);
        turns.iter().skip(skip).cloned().collect()
    }

    /// Number of turns currently held for a user (0 for unknown users)
    pub fn len(&self, user_id: UserId) -> usize {
        self.users
            .read()
            .get(&user_id)
            .map(|slot| slot.turns.lock().len())
            .unwrap_or(0)
    }

    /// Number of users seen since startup
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Wait for exclusive use of a user's conversation
    ///
    /// Held by the responder for one full request/reply cycle so concurrent
    /// messages from the same user keep their turns paired.
    pub async fn exchange_lock(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let exchange = Arc::clone(&self.slot(user_id).exchange);
        exchange.lock_owned().await
    }
}
