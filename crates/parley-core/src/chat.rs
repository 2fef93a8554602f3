use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use parley_db::{ChatStore, DbError, UserStore};
use parley_types::UserId;
use parley_types::api::{ChatPreview, Partner};
use parley_types::models::Chat;

use crate::error::{ServiceError, ServiceResult};

/// Resolves one-to-one chats and builds a user's inbox.
pub struct ChatService<C, U> {
    chats: Arc<C>,
    users: Arc<U>,
}

impl<C: ChatStore, U: UserStore> ChatService<C, U> {
    pub fn new(chats: Arc<C>, users: Arc<U>) -> Self {
        Self { chats, users }
    }

    /// Returns the chat between `requester` and `partner`, creating it on the
    /// first request. Repeated or concurrent calls for the same pair, in
    /// either order, always yield the same row.
    pub fn create_chat(&self, requester: UserId, partner: UserId) -> ServiceResult<Chat> {
        if !requester.is_set() || !partner.is_set() {
            warn!(%requester, %partner, "create_chat: unset user id");
            return Err(ServiceError::InvalidArgument(
                "requester and partner ids must be non-zero".into(),
            ));
        }
        if requester == partner {
            warn!(%requester, "create_chat: self chat rejected");
            return Err(ServiceError::SelfChat);
        }

        let (low, high) = canonical_pair(requester, partner);

        if let Some(chat) = self.chats.find_chat_by_pair(low, high)? {
            debug!(chat_id = %chat.id, %low, %high, "create_chat: existing chat");
            return Ok(chat);
        }

        match self.chats.create_chat(low, high) {
            Ok(chat) => {
                info!(chat_id = %chat.id, %low, %high, "chat created");
                Ok(chat)
            }
            Err(e) if e.is_conflict() => {
                // Another request created the pair between our lookup and insert.
                debug!(%low, %high, "create_chat: lost insert race, re-fetching");
                self.chats.find_chat_by_pair(low, high)?.ok_or_else(|| {
                    ServiceError::Storage(DbError::NotFound(format!(
                        "chat ({}, {}) missing after unique conflict",
                        low, high
                    )))
                })
            }
            Err(e) => {
                error!(%low, %high, error = %e, "create_chat: insert failed");
                Err(e.into())
            }
        }
    }

    /// All chats of `user` as previews, most recent conversation first.
    ///
    /// Chats whose preview cannot be built are logged and left out; they never
    /// fail the whole list.
    pub fn chat_list(&self, user: UserId) -> ServiceResult<Vec<ChatPreview>> {
        if !user.is_set() {
            warn!("chat_list: unset user id");
            return Err(ServiceError::InvalidArgument("user id must be non-zero".into()));
        }

        let chats = self.chats.list_chats_for_user(user).inspect_err(|e| {
            error!(%user, error = %e, "chat_list: failed to load chats");
        })?;

        if chats.is_empty() {
            debug!(%user, "chat_list: no chats");
            return Ok(Vec::new());
        }

        let mut previews = Vec::with_capacity(chats.len());
        for chat in &chats {
            match self.preview(chat, user) {
                Ok(preview) => previews.push(preview),
                Err(e) => warn!(chat_id = %chat.id, %user, error = %e, "chat_list: skipping chat"),
            }
        }

        sort_previews(&mut previews);
        debug!(%user, count = previews.len(), "chat_list: built previews");
        Ok(previews)
    }

    fn preview(&self, chat: &Chat, user: UserId) -> ServiceResult<ChatPreview> {
        let partner_id = chat.partner_of(user);
        if !partner_id.is_set() {
            return Err(ServiceError::InvalidArgument(format!(
                "chat {} has no valid partner",
                chat.id
            )));
        }

        let partner = self
            .users
            .get_user_by_id(partner_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("partner user {}", partner_id)))?;

        let last = self.chats.last_message_for_chat(chat.id)?;

        Ok(ChatPreview {
            chat_id: chat.id,
            partner: Partner {
                id: partner_id,
                name: partner.user.name,
            },
            last_message_time: last.as_ref().map(|m| m.created_at),
            last_message: last.map(|m| m.text),
        })
    }
}

/// Orders two distinct participants smaller id first.
pub fn canonical_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Newest last message first, chats without messages at the end, chat id
/// ascending between equals.
fn sort_previews(previews: &mut [ChatPreview]) {
    previews.sort_by(|a, b| {
        let by_time = match (a.last_message_time, b.last_message_time) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time.then(a.chat_id.cmp(&b.chat_id))
    });
}
