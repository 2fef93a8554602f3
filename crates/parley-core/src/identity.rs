use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand_core::OsRng;
use tracing::{error, info, warn};

use parley_db::{NewUser, UserStore};
use parley_types::UserId;
use parley_types::models::User;

use crate::error::{ServiceError, ServiceResult};

/// Mints bearer tokens for authenticated users.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: UserId) -> anyhow::Result<String>;
}

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with a random salt per password, PHC string output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("argon2 hash failed: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is unparseable: {}", e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

pub struct IdentityService<U, T, H = Argon2Hasher> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: H,
}

impl<U: UserStore, T: TokenIssuer> IdentityService<U, T> {
    pub fn new(users: Arc<U>, tokens: Arc<T>) -> Self {
        Self::with_hasher(users, tokens, Argon2Hasher)
    }
}

impl<U: UserStore, T: TokenIssuer, H: CredentialHasher> IdentityService<U, T, H> {
    pub fn with_hasher(users: Arc<U>, tokens: Arc<T>, hasher: H) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> ServiceResult<User> {
        info!(email, "register started");

        if let Err(reason) = validate_registration(name, email, password) {
            warn!(email, reason, "register validation failed");
            return Err(ServiceError::Validation(reason.into()));
        }

        if self.users.get_user_by_email(email)?.is_some() {
            warn!(email, "register failed: email already exists");
            return Err(ServiceError::Conflict(format!("email {} is already registered", email)));
        }

        let password_hash = self.hasher.hash(password).inspect_err(|e| {
            error!(email, error = %e, "register failed: hashing error");
        })?;

        let stored = self
            .users
            .create_user(NewUser {
                name,
                email,
                password_hash: &password_hash,
            })
            .map_err(|e| {
                // Lost a race with a concurrent registration of the same email.
                if e.is_conflict() {
                    ServiceError::Conflict(format!("email {} is already registered", email))
                } else {
                    error!(email, error = %e, "register failed: store error");
                    e.into()
                }
            })?;

        info!(user_id = %stored.user.id, email, "register success");
        Ok(stored.user)
    }

    /// Returns a bearer token for valid credentials.
    pub fn login(&self, email: &str, password: &str) -> ServiceResult<String> {
        let Some(stored) = self.users.get_user_by_email(email)? else {
            warn!(email, "login failed: invalid credentials");
            return Err(ServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &stored.password_hash) {
            warn!(email, user_id = %stored.user.id, "login failed: invalid credentials");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(stored.user.id).inspect_err(|e| {
            error!(user_id = %stored.user.id, error = %e, "login failed: token error");
        })?;

        info!(user_id = %stored.user.id, "login success");
        Ok(token)
    }

    pub fn profile(&self, user_id: UserId) -> ServiceResult<User> {
        if !user_id.is_set() {
            return Err(ServiceError::InvalidArgument("user id must be non-zero".into()));
        }

        self.users
            .get_user_by_id(user_id)?
            .map(|stored| stored.user)
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", user_id)))
    }
}

fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name must not be empty");
    }
    if email.is_empty() {
        return Err("email must not be empty");
    }
    if password.is_empty() {
        return Err("password must not be empty");
    }
    Ok(())
}
