use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use parley_types::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified caller, inserted by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

/// Extract and validate the bearer token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(ApiError::unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::unauthorized)?;

    let claims = state.keys.verify(token.trim()).map_err(|e| {
        debug!("token rejected: {}", e);
        ApiError::unauthorized()
    })?;

    if !claims.sub.is_set() {
        return Err(ApiError::unauthorized());
    }

    req.extensions_mut().insert(AuthUser(claims.sub));
    Ok(next.run(req).await)
}
