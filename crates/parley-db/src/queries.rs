use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use parley_types::models::{Chat, Message};
use parley_types::{ChatId, UserId};

use crate::Database;
use crate::error::DbResult;
use crate::models::{
    ChatRow, MessageRow, NewMessage, NewUser, StoredUser, UserRow, format_timestamp,
    parse_timestamp,
};
use crate::repository::{ChatStore, UserStore};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";
const CHAT_COLUMNS: &str = "id, user1_id, user2_id, created_at";
const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, text, created_at";

// -- Users --

impl UserStore for Database {
    fn create_user(&self, new: NewUser<'_>) -> DbResult<StoredUser> {
        let created_at = format_timestamp(Utc::now());

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                (new.name, new.email, new.password_hash, &created_at),
            )?;
            let id = conn.last_insert_rowid();
            debug!(user_id = id, email = new.email, "user row created");

            UserRow {
                id,
                name: new.name.to_string(),
                email: new.email.to_string(),
                password_hash: new.password_hash.to_string(),
                created_at,
            }
            .into_stored()
        })
    }

    fn get_user_by_id(&self, id: UserId) -> DbResult<Option<StoredUser>> {
        self.with_conn(|conn| {
            query_user(conn, &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"), id.get())
        })
    }

    fn get_user_by_email(&self, email: &str) -> DbResult<Option<StoredUser>> {
        self.with_conn(|conn| {
            query_user(conn, &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"), email)
        })
    }
}

// -- Chats & messages --

impl ChatStore for Database {
    fn find_chat_by_pair(&self, low: UserId, high: UserId) -> DbResult<Option<Chat>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {CHAT_COLUMNS} FROM chats WHERE user1_id = ?1 AND user2_id = ?2"),
                    (low.get(), high.get()),
                    chat_row,
                )
                .optional()?;

            row.map(ChatRow::into_chat).transpose()
        })
    }

    fn create_chat(&self, low: UserId, high: UserId) -> DbResult<Chat> {
        let created_at = format_timestamp(Utc::now());

        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO chats (user1_id, user2_id, created_at) VALUES (?1, ?2, ?3)",
                (low.get(), high.get(), &created_at),
            )?;
            let id = conn.last_insert_rowid();
            debug!(chat_id = id, user1_id = low.get(), user2_id = high.get(), "chat row created");

            ChatRow {
                id,
                user1_id: low.get(),
                user2_id: high.get(),
                created_at,
            }
            .into_chat()
        })
    }

    fn list_chats_for_user(&self, user: UserId) -> DbResult<Vec<Chat>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHAT_COLUMNS} FROM chats WHERE user1_id = ?1 OR user2_id = ?1"
            ))?;

            let rows = stmt
                .query_map([user.get()], chat_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(ChatRow::into_chat).collect()
        })
    }

    fn last_message_for_chat(&self, chat: ChatId) -> DbResult<Option<Message>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE chat_id = ?1
                         ORDER BY created_at DESC, id DESC
                         LIMIT 1"
                    ),
                    [chat.get()],
                    message_row,
                )
                .optional()?;

            row.map(MessageRow::into_message).transpose()
        })
    }

    fn create_message(&self, new: NewMessage<'_>) -> DbResult<Message> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            // Clamp against the newest stored message so per-chat timestamps
            // never go backwards, even if the wall clock does.
            let latest: Option<String> = tx.query_row(
                "SELECT MAX(created_at) FROM messages WHERE chat_id = ?1",
                [new.chat_id.get()],
                |r| r.get(0),
            )?;
            let mut created_at = Utc::now();
            if let Some(latest) = latest {
                created_at = created_at.max(parse_timestamp(&latest)?);
            }
            let created_at = format_timestamp(created_at);

            tx.execute(
                "INSERT INTO messages (chat_id, sender_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
                (new.chat_id.get(), new.sender_id.get(), new.text, &created_at),
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            MessageRow {
                id,
                chat_id: new.chat_id.get(),
                sender_id: new.sender_id.get(),
                text: new.text.to_string(),
                created_at,
            }
            .into_message()
        })
    }

    fn list_messages_for_chat(&self, chat: ChatId) -> DbResult<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE chat_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?;

            let rows = stmt
                .query_map([chat.get()], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter().map(MessageRow::into_message).collect()
        })
    }
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, sql: &str, key: P) -> DbResult<Option<StoredUser>> {
    let row = conn
        .query_row(sql, [key], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    row.map(UserRow::into_stored).transpose()
}

fn chat_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatRow> {
    Ok(ChatRow {
        id: row.get(0)?,
        user1_id: row.get(1)?,
        user2_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        sender_id: row.get(2)?,
        text: row.get(3)?,
        created_at: row.get(4)?,
    })
}
