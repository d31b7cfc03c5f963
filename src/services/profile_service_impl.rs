//! `SeaORM` implementation of the `ProfileService` trait.

use crate::db::{Store, User};
use crate::services::profile_service::{ProfileError, ProfileService, ProfileUpdate};

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn get(&self, user_id: i32) -> Result<User, ProfileError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(ProfileError::NotFound(user_id))
    }

    async fn update(&self, user_id: i32, update: ProfileUpdate) -> Result<User, ProfileError> {
        let users = self.store.user_repo();

        if let Some(email) = &update.email
            && users.email_taken(email, Some(user_id)).await?
        {
            return Err(ProfileError::Conflict(
                "Email already registered".to_string(),
            ));
        }

        users
            .update_profile(user_id, update.email, update.profile_picture)
            .await?
            .ok_or(ProfileError::NotFound(user_id))
    }
}
