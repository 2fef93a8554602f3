use axum::{Extension, extract::State, response::IntoResponse};

use parley_types::api::{CreateChatRequest, CreateChatResponse};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::{AppState, run_blocking};

/// Opens (or returns the existing) chat between the caller and `partner_id`.
pub async fn create_chat(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let chat = run_blocking(&state, move |s| s.chats.create_chat(user_id, req.partner_id)).await?;

    Ok(ApiJson(CreateChatResponse::from(chat)))
}

pub async fn list_chats(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let previews = run_blocking(&state, move |s| s.chats.chat_list(user_id)).await?;

    Ok(ApiJson(previews))
}
