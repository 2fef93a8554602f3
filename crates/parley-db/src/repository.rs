//! Store traits. The services depend on these rather than on `Database`, so
//! any relational backend (or a test double) can stand behind them.
//!
//! "Not found" is modelled as `Ok(None)`; every `Err` is a real store failure.

use parley_types::models::{Chat, Message};
use parley_types::{ChatId, UserId};

use crate::error::DbResult;
use crate::models::{NewMessage, NewUser, StoredUser};

/// Persists user identity, email, name and password hash.
pub trait UserStore: Send + Sync {
    /// Fails with `DbError::Conflict` when the email is already registered.
    fn create_user(&self, new: NewUser<'_>) -> DbResult<StoredUser>;

    fn get_user_by_id(&self, id: UserId) -> DbResult<Option<StoredUser>>;

    fn get_user_by_email(&self, email: &str) -> DbResult<Option<StoredUser>>;
}

/// Persists chat pairs and their messages.
pub trait ChatStore: Send + Sync {
    /// `low` and `high` must already be in canonical order.
    fn find_chat_by_pair(&self, low: UserId, high: UserId) -> DbResult<Option<Chat>>;

    /// Fails with `DbError::Conflict` when the pair already has a chat.
    fn create_chat(&self, low: UserId, high: UserId) -> DbResult<Chat>;

    /// Every chat where `user` is either participant, in no guaranteed order.
    fn list_chats_for_user(&self, user: UserId) -> DbResult<Vec<Chat>>;

    fn last_message_for_chat(&self, chat: ChatId) -> DbResult<Option<Message>>;

    /// Assigns id and timestamp. The timestamp never precedes the latest
    /// message already stored for the same chat.
    fn create_message(&self, new: NewMessage<'_>) -> DbResult<Message>;

    /// Newest first.
    fn list_messages_for_chat(&self, chat: ChatId) -> DbResult<Vec<Message>>;
}
