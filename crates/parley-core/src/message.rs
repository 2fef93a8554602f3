use std::sync::Arc;

use tracing::{debug, error, info, warn};

use parley_db::{ChatStore, NewMessage};
use parley_types::models::Message;
use parley_types::{ChatId, UserId};

use crate::error::{ServiceError, ServiceResult};

pub struct MessageService<C> {
    chats: Arc<C>,
}

impl<C: ChatStore> MessageService<C> {
    pub fn new(chats: Arc<C>) -> Self {
        Self { chats }
    }

    /// Persists a message. Whitespace-only text counts as non-empty.
    ///
    /// Membership of `sender_id` in the chat is not checked here.
    pub fn send_message(&self, chat_id: ChatId, sender_id: UserId, text: &str) -> ServiceResult<Message> {
        if !chat_id.is_set() {
            warn!(%chat_id, %sender_id, "send_message: unset chat id");
            return Err(ServiceError::InvalidArgument("chat_id must be non-zero".into()));
        }
        if !sender_id.is_set() {
            warn!(%chat_id, %sender_id, "send_message: unset sender id");
            return Err(ServiceError::InvalidArgument("sender_id must be non-zero".into()));
        }
        if text.is_empty() {
            warn!(%chat_id, %sender_id, "send_message: empty text");
            return Err(ServiceError::InvalidArgument("text must not be empty".into()));
        }

        let message = self
            .chats
            .create_message(NewMessage {
                chat_id,
                sender_id,
                text,
            })
            .inspect_err(|e| {
                error!(%chat_id, %sender_id, error = %e, "send_message: store failed");
            })?;

        info!(message_id = %message.id, %chat_id, %sender_id, "message created");
        Ok(message)
    }

    /// Every message of `chat_id`, newest first.
    pub fn history(&self, chat_id: ChatId) -> ServiceResult<Vec<Message>> {
        if !chat_id.is_set() {
            warn!("history: unset chat id");
            return Err(ServiceError::InvalidArgument("chat_id must be non-zero".into()));
        }

        let messages = self.chats.list_messages_for_chat(chat_id).inspect_err(|e| {
            error!(%chat_id, error = %e, "history: store failed");
        })?;

        debug!(%chat_id, count = messages.len(), "history fetched");
        Ok(messages)
    }
}
