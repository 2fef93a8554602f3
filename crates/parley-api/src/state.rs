use std::sync::Arc;

use tracing::error;

use parley_core::{ChatService, IdentityService, MessageService, ServiceResult};
use parley_db::Database;

use crate::error::ApiError;
use crate::tokens::JwtKeys;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub identity: IdentityService<Database, JwtKeys>,
    pub chats: ChatService<Database, Database>,
    pub messages: MessageService<Database>,
    pub keys: Arc<JwtKeys>,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, keys: JwtKeys) -> AppState {
        let keys = Arc::new(keys);
        Arc::new(Self {
            identity: IdentityService::new(db.clone(), keys.clone()),
            chats: ChatService::new(db.clone(), db.clone()),
            messages: MessageService::new(db),
            keys,
        })
    }
}

/// Runs a blocking service call off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.as_ref()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}
