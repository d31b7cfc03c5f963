//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User};
use crate::services::auth_service::{AuthError, AuthService, LoginResult, SignupRequest};
use crate::services::token::SessionTokens;
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    tokens: SessionTokens,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig, tokens: SessionTokens) -> Self {
        Self {
            store,
            security,
            tokens,
        }
    }

    fn check_password_length(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, request: SignupRequest) -> Result<User, AuthError> {
        self.check_password_length(&request.password)?;

        let users = self.store.user_repo();

        if users.username_taken(&request.username).await? {
            return Err(AuthError::Conflict("Username already taken".to_string()));
        }

        if users.email_taken(&request.email, None).await? {
            return Err(AuthError::Conflict("Email already registered".to_string()));
        }

        let user = self
            .store
            .create_user(
                NewUser {
                    username: request.username,
                    email: request.email,
                    password: request.password,
                },
                &self.security,
            )
            .await?;

        info!(user_id = user.id, username = %user.username, "User signed up");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let Some(user) = self.store.verify_user_password(username, password).await? else {
            warn!(username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))?;

        Ok(LoginResult { user, token })
    }

    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self.tokens.user_id(token).ok_or(AuthError::Unauthorized)?;

        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.check_password_length(new_password)?;

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let users = self.store.user_repo();

        if !users
            .verify_password_by_id(user_id, current_password)
            .await?
        {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        users
            .update_password(user_id, new_password, &self.security)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn delete_account(&self, user_id: i32) -> Result<(), AuthError> {
        if !self.store.user_repo().soft_delete(user_id).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id, "Account deleted");
        Ok(())
    }

    fn session_ttl(&self) -> chrono::Duration {
        self.tokens.ttl()
    }
}
