use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, Result};

use super::types::{ApiResponse, GetUpdates, SendMessage, Update, User};

/// Longest message the Bot API accepts, in UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;

/// Extra time allowed on top of the long-poll timeout before the HTTP
/// request itself is abandoned.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Minimal Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(poll_timeout + REQUEST_GRACE)
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", api_url, token),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // reqwest errors embed the request URL, which carries the token.
        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?
            .json()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        response.into_result()
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let request = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: vec!["message"],
        };
        self.call("getUpdates", &request).await
    }

    /// Send `text` to a chat, split into as many messages as the size limit
    /// requires.
    pub async fn send_message(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        let chunks = split_message(text, MESSAGE_LIMIT);
        debug!("Sending {} message(s) to chat {}", chunks.len(), chat_id);

        for chunk in &chunks {
            let request = SendMessage {
                chat_id,
                text: chunk,
                parse_mode: markdown.then_some("Markdown"),
            };
            self.call::<_, serde_json::Value>("sendMessage", &request)
                .await?;
        }
        Ok(())
    }
}

/// Split text into chunks of at most `limit` UTF-16 code units, breaking on
/// line boundaries where possible. Lines longer than the limit are cut
/// between characters.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len: usize = line.chars().map(char::len_utf16).sum();

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        for ch in line.chars() {
            if current_len + ch.len_utf16() > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += ch.len_utf16();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
