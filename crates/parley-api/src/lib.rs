//! HTTP boundary for Parley: axum handlers, bearer-token middleware and the
//! mapping from service errors to responses.

pub mod auth;
pub mod chats;
pub mod error;
pub mod extract;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tokens;

pub use routes::router;
pub use state::{AppState, AppStateInner};
pub use tokens::JwtKeys;
