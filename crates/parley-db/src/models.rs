//! Row types and timestamp encoding. Rows map 1:1 to SQLite columns and are
//! converted into `parley_types` models before leaving this crate.

use chrono::{DateTime, SecondsFormat, Utc};
use parley_types::models::{Chat, Message, User};
use parley_types::{ChatId, MessageId, UserId};

use crate::error::{DbError, DbResult};

/// Input for `UserStore::create_user`. The password must already be hashed.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct NewMessage<'a> {
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub text: &'a str,
}

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct ChatRow {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub text: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_stored(self) -> DbResult<StoredUser> {
        Ok(StoredUser {
            user: User {
                id: UserId(self.id),
                name: self.name,
                email: self.email,
                created_at: parse_timestamp(&self.created_at)?,
            },
            password_hash: self.password_hash,
        })
    }
}

impl ChatRow {
    pub fn into_chat(self) -> DbResult<Chat> {
        Ok(Chat {
            id: ChatId(self.id),
            user1_id: UserId(self.user1_id),
            user2_id: UserId(self.user2_id),
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl MessageRow {
    pub fn into_message(self) -> DbResult<Message> {
        Ok(Message {
            id: MessageId(self.id),
            chat_id: ChatId(self.chat_id),
            sender_id: UserId(self.sender_id),
            text: self.text,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Fixed-width RFC 3339 in UTC with microseconds, so lexical order in SQL
/// equals chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Corrupt(format!("bad timestamp '{}': {}", raw, e)))
}
