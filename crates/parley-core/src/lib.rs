//! parley-core: the chat and message domain logic.
//!
//! - `ChatService`: canonical chat resolution and the enriched chat list
//! - `MessageService`: sending messages and reading chat history
//! - `IdentityService`: registration, login and profile lookup
//!
//! Every service is stateless. It holds `Arc`s to the stores it reads and
//! recomputes everything from them on each call.

pub mod chat;
pub mod error;
pub mod identity;
pub mod message;

#[cfg(test)]
mod tests;

pub use chat::{ChatService, canonical_pair};
pub use error::{ServiceError, ServiceResult};
pub use identity::{Argon2Hasher, CredentialHasher, IdentityService, TokenIssuer};
pub use message::MessageService;
