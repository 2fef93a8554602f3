use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// `Json` whose rejections render as `ApiError`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// `Path` whose rejections render as `ApiError`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
