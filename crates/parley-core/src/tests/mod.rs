mod chat_service_tests;

use std::sync::Arc;

use parley_db::{Database, NewUser, UserStore};
use parley_types::UserId;

fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().expect("in-memory database"))
}

fn create_user(db: &Database, name: &str) -> UserId {
    db.create_user(NewUser {
        name,
        email: &format!("{name}@example.com"),
        password_hash: "hash",
    })
    .expect("create user")
    .user
    .id
}
