use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;

use parley_types::ChatId;
use parley_types::api::SendMessageRequest;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthUser;
use crate::state::{AppState, run_blocking};

/// The body names its sender; it has to be the authenticated caller.
/// Chat membership is not checked.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.sender_id != user_id {
        warn!(%user_id, sender_id = %req.sender_id, chat_id = %req.chat_id, "sender mismatch");
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "sender_id must match the authenticated user",
        ));
    }

    let message = run_blocking(&state, move |s| {
        s.messages.send_message(req.chat_id, req.sender_id, &req.text)
    })
    .await?;

    Ok((StatusCode::CREATED, ApiJson(message)))
}

pub async fn get_history(
    State(state): State<AppState>,
    ApiPath(chat_id): ApiPath<i64>,
    // Any authenticated caller may read any chat; membership is not checked.
    Extension(_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let chat_id = ChatId(chat_id);
    let messages = run_blocking(&state, move |s| s.messages.history(chat_id)).await?;

    Ok(ApiJson(messages))
}
