//! Shared data contracts for Parley: typed ids, domain models and the JSON
//! shapes exchanged over the HTTP API.

pub mod api;
pub mod ids;
pub mod models;

pub use ids::{ChatId, MessageId, UserId};
