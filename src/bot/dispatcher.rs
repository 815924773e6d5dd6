use std::sync::Arc;

use tracing::{debug, info};

use crate::db::{format_result_set, SessionManager};

use super::command::parse_command;
use super::conversation::{ConversationState, Conversations};

const HELP_TEXT: &str = "*teql* 🫠\n\n\
    `all functions:`\n\
    */connect* `〔connection string〕`\n\
    */query* `〔SQL query〕`";
const CONNECT_PROMPT: &str = "enter database connection string.";
const INVALID_CONNECTION_STRING: &str = "database connection string is not valid.";
const QUERY_USAGE: &str = "error: /query [sql query here].";
const UNKNOWN_COMMAND: &str = "error, using /start to know.";
const EMPTY_RESULT: &str = "(no rows)";

/// Text to send back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }
}

/// Work decided for one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Reply(Reply),
    Connect(String),
    Query(String),
}

/// Routes chat messages to the session engine.
pub struct Dispatcher {
    sessions: Arc<SessionManager>,
    conversations: Conversations,
}

impl Dispatcher {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            sessions,
            conversations: Conversations::new(),
        }
    }

    /// Decide what to do with a message and apply any conversation state
    /// change. Returns `None` when the message needs no reply.
    ///
    /// This is cheap and must run in arrival order for a chat; the returned
    /// action may then be performed concurrently.
    pub async fn route(&self, chat_id: i64, text: &str) -> Option<Action> {
        if self.conversations.take(chat_id).await == ConversationState::AwaitingConnectionString {
            if text.trim().is_empty() {
                return Some(Action::Reply(Reply::plain(INVALID_CONNECTION_STRING)));
            }
            return Some(Action::Connect(text.to_string()));
        }

        let command = parse_command(text)?;
        debug!("Chat {} sent /{}", chat_id, command.name);

        let action = match command.name.as_str() {
            "start" | "help" => Action::Reply(Reply::markdown(HELP_TEXT)),
            "connect" if command.args.is_empty() => {
                self.conversations.begin_connect(chat_id).await;
                Action::Reply(Reply::plain(CONNECT_PROMPT))
            }
            "connect" => Action::Connect(command.args),
            "query" if command.args.is_empty() => Action::Reply(Reply::plain(QUERY_USAGE)),
            "query" => Action::Query(command.args),
            _ => Action::Reply(Reply::plain(UNKNOWN_COMMAND)),
        };
        Some(action)
    }

    /// Carry out an action against the session engine.
    pub async fn perform(&self, action: Action) -> Reply {
        match action {
            Action::Reply(reply) => reply,
            Action::Connect(conn_str) => match self.sessions.connect(&conn_str).await {
                Ok(dialect) => {
                    info!("Connected to {} database", dialect);
                    Reply::plain(format!("connected: {}", dialect))
                }
                Err(e) => Reply::plain(e.reply_text()),
            },
            Action::Query(sql) => match self.sessions.query(&sql).await {
                Ok(rs) if rs.is_empty() => Reply::plain(EMPTY_RESULT),
                Ok(rs) => Reply::plain(format_result_set(&rs)),
                Err(e) => {
                    debug!("Query failed: {}", e.code());
                    Reply::plain(e.reply_text())
                }
            },
        }
    }

    #[cfg(test)]
    pub async fn handle(&self, chat_id: i64, text: &str) -> Option<Reply> {
        let action = self.route(chat_id, text).await?;
        Some(self.perform(action).await)
    }
}
