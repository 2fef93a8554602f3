use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use parley_db::{ChatStore, Database, DbError, DbResult, NewMessage};
use parley_types::models::{Chat, Message};
use parley_types::{ChatId, UserId};

use super::{create_user, test_db};
use crate::chat::ChatService;
use crate::error::ServiceError;

/// Misses the first pair lookup, as a request that read before a concurrent
/// insert committed would.
struct StaleFirstLookup {
    inner: Arc<Database>,
    stale: AtomicBool,
}

/// Fails the last-message lookup for one chat.
struct BrokenChat {
    inner: Arc<Database>,
    broken: ChatId,
}

impl ChatStore for StaleFirstLookup {
    fn find_chat_by_pair(&self, low: UserId, high: UserId) -> DbResult<Option<Chat>> {
        if self.stale.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_chat_by_pair(low, high)
    }

    fn create_chat(&self, low: UserId, high: UserId) -> DbResult<Chat> {
        self.inner.create_chat(low, high)
    }

    fn list_chats_for_user(&self, user: UserId) -> DbResult<Vec<Chat>> {
        self.inner.list_chats_for_user(user)
    }

    fn last_message_for_chat(&self, chat: ChatId) -> DbResult<Option<Message>> {
        self.inner.last_message_for_chat(chat)
    }

    fn create_message(&self, new: NewMessage<'_>) -> DbResult<Message> {
        self.inner.create_message(new)
    }

    fn list_messages_for_chat(&self, chat: ChatId) -> DbResult<Vec<Message>> {
        self.inner.list_messages_for_chat(chat)
    }
}

impl ChatStore for BrokenChat {
    fn find_chat_by_pair(&self, low: UserId, high: UserId) -> DbResult<Option<Chat>> {
        self.inner.find_chat_by_pair(low, high)
    }

    fn create_chat(&self, low: UserId, high: UserId) -> DbResult<Chat> {
        self.inner.create_chat(low, high)
    }

    fn list_chats_for_user(&self, user: UserId) -> DbResult<Vec<Chat>> {
        self.inner.list_chats_for_user(user)
    }

    fn last_message_for_chat(&self, chat: ChatId) -> DbResult<Option<Message>> {
        if chat == self.broken {
            return Err(DbError::Corrupt(format!("chat {chat}")));
        }
        self.inner.last_message_for_chat(chat)
    }

    fn create_message(&self, new: NewMessage<'_>) -> DbResult<Message> {
        self.inner.create_message(new)
    }

    fn list_messages_for_chat(&self, chat: ChatId) -> DbResult<Vec<Message>> {
        self.inner.list_messages_for_chat(chat)
    }
}

fn send(db: &Database, chat: ChatId, sender: UserId, text: &str) -> Message {
    db.create_message(NewMessage {
        chat_id: chat,
        sender_id: sender,
        text,
    })
    .expect("create message")
}

#[test]
fn test_create_chat_is_canonical_and_idempotent() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");
    let service = ChatService::new(db.clone(), db.clone());

    let first = service.create_chat(bob, alice).expect("create chat");
    assert_eq!(first.user1_id, alice);
    assert_eq!(first.user2_id, bob);

    let again = service.create_chat(alice, bob).expect("create chat again");
    assert_eq!(again, first);
    let third = service.create_chat(bob, alice).expect("create chat third time");
    assert_eq!(third.id, first.id);

    assert_eq!(db.list_chats_for_user(alice).unwrap().len(), 1);
}

#[test]
fn test_self_chat_rejected() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let service = ChatService::new(db.clone(), db.clone());

    let result = service.create_chat(alice, alice);
    assert!(matches!(result, Err(ServiceError::SelfChat)));
    assert!(db.list_chats_for_user(alice).unwrap().is_empty());
}

#[test]
fn test_unset_ids_rejected() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let service = ChatService::new(db.clone(), db.clone());

    assert!(matches!(
        service.create_chat(UserId(0), alice),
        Err(ServiceError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.create_chat(alice, UserId(0)),
        Err(ServiceError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.chat_list(UserId(0)),
        Err(ServiceError::InvalidArgument(_))
    ));
}

#[test]
fn test_chat_with_unknown_partner_is_storage_error() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let service = ChatService::new(db.clone(), db.clone());

    let result = service.create_chat(alice, UserId(404));
    assert!(matches!(
        result,
        Err(ServiceError::Storage(DbError::MissingReference(_)))
    ));
}

#[test]
fn test_create_chat_recovers_from_lost_race() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");

    // The winner's row is already committed, but our lookup misses it.
    let existing = db.create_chat(alice, bob).unwrap();
    let store = Arc::new(StaleFirstLookup {
        inner: db.clone(),
        stale: AtomicBool::new(true),
    });
    let service = ChatService::new(store, db.clone());

    let chat = service.create_chat(bob, alice).expect("conflict resolved");
    assert_eq!(chat.id, existing.id);
    assert_eq!(db.list_chats_for_user(alice).unwrap().len(), 1);
}

#[test]
fn test_concurrent_create_chat_returns_same_chat() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");
    let service = Arc::new(ChatService::new(db.clone(), db.clone()));
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [(alice, bob), (bob, alice)]
        .into_iter()
        .map(|(me, partner)| {
            let service = service.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                service.create_chat(me, partner)
            })
        })
        .collect();

    let ids: Vec<ChatId> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked").expect("create chat").id)
        .collect();

    assert_eq!(ids[0], ids[1]);
    assert_eq!(db.list_chats_for_user(alice).unwrap().len(), 1);
}

#[test]
fn test_chat_list_empty() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let service = ChatService::new(db.clone(), db.clone());

    let previews = service.chat_list(alice).expect("chat list");
    assert!(previews.is_empty());
}

#[test]
fn test_chat_list_ordering_and_enrichment() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");
    let carol = create_user(&db, "carol");
    let dave = create_user(&db, "dave");
    let service = ChatService::new(db.clone(), db.clone());

    // Created first, so it also has the smallest id; it stays silent.
    let silent = service.create_chat(alice, dave).unwrap();
    let with_bob = service.create_chat(alice, bob).unwrap();
    let with_carol = service.create_chat(carol, alice).unwrap();

    send(&db, with_carol.id, carol, "older");
    send(&db, with_bob.id, alice, "first");
    send(&db, with_bob.id, bob, "newest");

    let previews = service.chat_list(alice).expect("chat list");
    let order: Vec<ChatId> = previews.iter().map(|p| p.chat_id).collect();
    assert_eq!(order, vec![with_bob.id, with_carol.id, silent.id]);

    let bob_preview = &previews[0];
    assert_eq!(bob_preview.partner.id, bob);
    assert_eq!(bob_preview.partner.name, "bob");
    assert_eq!(bob_preview.last_message.as_deref(), Some("newest"));
    assert!(bob_preview.last_message_time.is_some());

    assert_eq!(previews[1].partner.name, "carol");
    assert_eq!(previews[1].last_message.as_deref(), Some("older"));

    let silent_preview = &previews[2];
    assert_eq!(silent_preview.partner.name, "dave");
    assert!(silent_preview.last_message.is_none());
    assert!(silent_preview.last_message_time.is_none());
}

#[test]
fn test_chat_list_seen_from_partner_side() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");
    let service = ChatService::new(db.clone(), db.clone());

    let chat = service.create_chat(alice, bob).unwrap();
    send(&db, chat.id, alice, "hi bob");

    let previews = service.chat_list(bob).unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].partner.id, alice);
    assert_eq!(previews[0].partner.name, "alice");
    assert_eq!(previews[0].last_message.as_deref(), Some("hi bob"));
}

#[test]
fn test_chat_list_skips_broken_chat() {
    let db = test_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");
    let carol = create_user(&db, "carol");

    let good = db.create_chat(alice, bob).unwrap();
    let bad = db.create_chat(alice, carol).unwrap();
    send(&db, good.id, bob, "still here");

    let store = Arc::new(BrokenChat {
        inner: db.clone(),
        broken: bad.id,
    });
    let service = ChatService::new(store, db.clone());

    let previews = service.chat_list(alice).expect("one bad chat must not fail the list");
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].chat_id, good.id);
}
