//! Domain service for the signed-in user's own profile.

use crate::db::{User, UserWriteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("User not found")]
    NotFound(i32),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl From<UserWriteError> for ProfileError {
    fn from(err: UserWriteError) -> Self {
        match err {
            UserWriteError::Duplicate(_) => Self::Conflict("Email already registered".to_string()),
            UserWriteError::Other(err) => err.into(),
        }
    }
}

/// Fields a user may change on their profile. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn get(&self, user_id: i32) -> Result<User, ProfileError>;

    /// # Errors
    ///
    /// [`ProfileError::Conflict`] if the new email belongs to another account.
    async fn update(&self, user_id: i32, update: ProfileUpdate) -> Result<User, ProfileError>;
}
