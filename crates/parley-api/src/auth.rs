use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use parley_types::api::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::{AppState, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |s| {
        s.identity.register(&req.name, &req.email, &req.password)
    })
    .await?;

    info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, ApiJson(UserResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = run_blocking(&state, move |s| s.identity.login(&req.email, &req.password)).await?;

    Ok(ApiJson(LoginResponse { token }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |s| s.identity.profile(user_id)).await?;

    Ok(ApiJson(UserResponse::from(user)))
}
