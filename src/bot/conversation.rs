use std::collections::HashMap;

use tokio::sync::Mutex;

/// Where a chat is in the connect dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    /// `/connect` was sent without arguments; the next message is the
    /// connection string.
    AwaitingConnectionString,
}

/// Per-chat conversation state keyed by chat id.
#[derive(Default)]
pub struct Conversations {
    states: Mutex<HashMap<i64, ConversationState>>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin_connect(&self, chat_id: i64) {
        self.states
            .lock()
            .await
            .insert(chat_id, ConversationState::AwaitingConnectionString);
    }

    /// Return the chat's state and reset it to idle.
    pub async fn take(&self, chat_id: i64) -> ConversationState {
        self.states
            .lock()
            .await
            .remove(&chat_id)
            .unwrap_or_default()
    }
}
