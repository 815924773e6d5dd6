pub mod command;
pub mod conversation;
pub mod dispatcher;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::telegram::TelegramClient;

pub use dispatcher::Dispatcher;

/// Pause before polling again after a transport error.
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Long-poll Telegram forever, dispatching each message.
///
/// Messages are routed in arrival order; connects and queries then run on
/// their own tasks so a slow database never stalls the loop.
pub async fn run_polling(client: TelegramClient, dispatcher: Arc<Dispatcher>, poll_timeout: Duration) {
    let mut offset = 0;

    loop {
        let updates = match client.get_updates(offset, poll_timeout).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("Failed to fetch updates: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            if message.from.as_ref().is_some_and(|u| u.is_bot) {
                continue;
            }

            let chat_id = message.chat.id;
            let text = message.text.unwrap_or_default();
            debug!(
                "Message {} from chat {} ({} chars)",
                message.message_id,
                chat_id,
                text.chars().count()
            );

            let Some(action) = dispatcher.route(chat_id, &text).await else {
                continue;
            };

            let client = client.clone();
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let reply = dispatcher.perform(action).await;
                if let Err(e) = client.send_message(chat_id, &reply.text, reply.markdown).await {
                    warn!("Failed to reply to chat {}: {}", chat_id, e);
                }
            });
        }
    }
}
