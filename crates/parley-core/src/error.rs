use parley_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input, such as an unset id or empty text.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("cannot open a chat with yourself")]
    SelfChat,

    #[error("already exists: {0}")]
    Conflict(String),

    /// Same error for unknown email and wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
