use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

pub const DEFAULT_ROLE: &str = "user";

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            profile_picture: model.profile_picture,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Failure from a write that touches a unique column.
#[derive(Debug, Error)]
pub enum UserWriteError {
    /// Another row already holds this value. Carries the column name.
    #[error("{0} already in use")]
    Duplicate(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UserWriteError {
    fn from_db(err: DbErr, action: &'static str) -> Self {
        match err.sql_err() {
            // SQLite reports "UNIQUE constraint failed: users.<column>".
            Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("email") => {
                Self::Duplicate("email")
            }
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Duplicate("username"),
            _ => Self::Other(anyhow::Error::new(err).context(action)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn active() -> Condition {
        Condition::all().add(users::Column::DeletedAt.is_null())
    }

    async fn find_active(&self, id: i32) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id)
            .filter(Self::active())
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to load user {id}"))
    }

    async fn find_active_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(Self::active())
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to load user {username:?}"))
    }

    /// Inserts the row after hashing the password on the blocking pool.
    /// A lost race on username or email comes back as [`UserWriteError::Duplicate`].
    pub async fn create(
        &self,
        new_user: NewUser,
        config: &SecurityConfig,
    ) -> Result<User, UserWriteError> {
        let password_hash = hash_off_runtime(new_user.password, config).await?;
        let now = chrono::Utc::now().to_rfc3339();

        users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            role: Set(DEFAULT_ROLE.to_string()),
            profile_picture: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .map(User::from)
        .map_err(|err| UserWriteError::from_db(err, "Failed to insert user"))
    }

    /// Soft-deleted rows count too: the unique constraints still cover them.
    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .map(|n| n > 0)
            .context("Failed to check username")
    }

    pub async fn email_taken(&self, email: &str, except_user: Option<i32>) -> Result<bool> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except_user {
            query = query.filter(users::Column::Id.ne(id));
        }
        query
            .count(&self.conn)
            .await
            .map(|n| n > 0)
            .context("Failed to check email")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        Ok(self.find_active(id).await?.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .find_active_by_username(username)
            .await?
            .map(User::from))
    }

    /// Returns the user when the password matches.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_active_by_username(username).await? else {
            return Ok(None);
        };
        let matches = verify_off_runtime(password, user.password_hash.clone()).await?;
        Ok(matches.then(|| User::from(user)))
    }

    pub async fn verify_password_by_id(&self, id: i32, password: &str) -> Result<bool> {
        match self.find_active(id).await? {
            Some(user) => verify_off_runtime(password, user.password_hash).await,
            None => Ok(false),
        }
    }

    pub async fn update_profile(
        &self,
        id: i32,
        email: Option<String>,
        profile_picture: Option<String>,
    ) -> Result<Option<User>, UserWriteError> {
        let Some(user) = self.find_active(id).await? else {
            return Ok(None);
        };

        if email.is_none() && profile_picture.is_none() {
            return Ok(Some(User::from(user)));
        }

        let mut active: users::ActiveModel = user.into();
        if let Some(email) = email {
            active.email = Set(email);
        }
        if let Some(picture) = profile_picture {
            active.profile_picture = Set(Some(picture));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .map_err(|err| UserWriteError::from_db(err, "Failed to update profile"))?;
        Ok(Some(User::from(updated)))
    }

    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = self
            .find_active(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;
        let new_hash = hash_off_runtime(new_password.to_string(), config).await?;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&self.conn)
            .await
            .context("Failed to store new password")?;
        Ok(())
    }

    /// Returns false when the user does not exist or is already deleted.
    pub async fn soft_delete(&self, id: i32) -> Result<bool> {
        let Some(user) = self.find_active(id).await? else {
            return Ok(false);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let mut active: users::ActiveModel = user.into();
        active.deleted_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active
            .update(&self.conn)
            .await
            .context("Failed to mark user deleted")?;
        Ok(true)
    }
}

// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_off_runtime(password: String, config: &SecurityConfig) -> Result<String> {
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

async fn verify_off_runtime(password: &str, password_hash: String) -> Result<bool> {
    let password = password.to_string();
    task::spawn_blocking(move || verify_hash(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// The PHC string carries its own parameters, so default `Argon2` verifies any cost.
fn verify_hash(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
