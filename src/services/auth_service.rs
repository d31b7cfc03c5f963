//! Domain service for accounts and sessions.
//!
//! Handles signup, login, session token checks, password changes and
//! account deletion.

use crate::db::{User, UserWriteError};
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or forged token, or a user that no longer exists.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<UserWriteError> for AuthError {
    fn from(err: UserWriteError) -> Self {
        match err {
            UserWriteError::Duplicate("email") => {
                Self::Conflict("Email already registered".to_string())
            }
            UserWriteError::Duplicate(_) => Self::Conflict("Username already taken".to_string()),
            UserWriteError::Other(err) => err.into(),
        }
    }
}

/// Signup input. Format checks on username and email happen before this
/// reaches the service; the password length is checked here against config.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the username or email is taken, and
    /// [`AuthError::Validation`] if the password is too short.
    async fn signup(&self, request: SignupRequest) -> Result<User, AuthError>;

    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a session token to a live user.
    async fn authenticate(&self, token: &str) -> Result<User, AuthError>;

    /// Changes the password after verifying the current one.
    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Soft-deletes the account.
    async fn delete_account(&self, user_id: i32) -> Result<(), AuthError>;

    /// Session lifetime, used for the cookie's Max-Age.
    fn session_ttl(&self) -> chrono::Duration;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_columns_become_conflicts() {
        let err = AuthError::from(UserWriteError::Duplicate("email"));
        assert!(matches!(err, AuthError::Conflict(ref msg) if msg == "Email already registered"));

        let err = AuthError::from(UserWriteError::Duplicate("username"));
        assert!(matches!(err, AuthError::Conflict(ref msg) if msg == "Username already taken"));
    }

    #[test]
    fn store_failures_keep_the_cause() {
        let cause = anyhow::anyhow!("database is locked").context("Failed to insert user");
        let AuthError::Internal(msg) = AuthError::from(UserWriteError::Other(cause)) else {
            panic!("expected an internal error");
        };
        assert_eq!(msg, "Failed to insert user: database is locked");
    }
}
