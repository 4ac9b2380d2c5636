//! Password hashing and bearer sessions.
//!
//! Passwords are stored as Argon2id PHC strings (`$argon2id$v=19$...`), so the
//! salt and cost parameters travel with each hash. Sessions are opaque tokens
//! kept server-side with an expiry, so logging out revokes a token immediately.

use crate::store::{Store, StoreError};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use lending_contracts::{LoginResponse, User};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Inactive user")]
    Inactive,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hash(err.to_string()))
}

/// Checks `password` against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Clone, Debug)]
pub struct Authenticator {
    store: Store,
    session_ttl: Duration,
}

impl Authenticator {
    pub fn new(store: Store, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        self.login_at(email, password, Utc::now())
    }

    pub fn login_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginResponse, AuthError> {
        let Some(creds) = self.store.credentials_by_email(email.trim())? else {
            tracing::info!(email, "login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &creds.password_hash) {
            tracing::info!(email, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !creds.user.is_active {
            return Err(AuthError::Inactive);
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        self.store
            .insert_session(&token, &creds.user.id, now + self.session_ttl)?;
        tracing::info!(
            user_id = %creds.user.id,
            role = creds.user.role.as_str(),
            "session opened"
        );

        Ok(LoginResponse {
            access_token: token,
            token_type: "bearer".into(),
            user: creds.user,
        })
    }

    pub fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        self.authenticate_at(token, Utc::now())
    }

    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, AuthError> {
        let user = self
            .store
            .session_user(token, now)?
            .ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::Inactive);
        }
        Ok(user)
    }

    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.store.delete_session(token)? {
            tracing::info!("session closed");
        }
        Ok(())
    }
}
