//! Domain service for personal watch lists.

use crate::domain::{AnimeId, ListStatus};
use crate::models::list::{
    ListEntry, ListEntryInput, ListEntryPatch, ListEntryView, ListMembership, ListStats,
};
use crate::services::anime_service::AnimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("Entry not found")]
    EntryNotFound(i32),

    /// The entry exists but belongs to someone else.
    #[error("Not authorized to modify this entry")]
    Forbidden(i32),

    #[error("User not found")]
    UserNotFound(String),

    #[error(transparent)]
    Anime(#[from] AnimeError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ListError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ListError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Outcome of add-to-list.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub entry: ListEntry,
    pub created: bool,
}

#[async_trait::async_trait]
pub trait ListService: Send + Sync {
    /// Adds a title to the list, or overwrites the existing entry for it.
    ///
    /// The title is hydrated into the cache first. A cache write is not undone
    /// if the list write then fails.
    async fn add(
        &self,
        user_id: i32,
        anime_id: AnimeId,
        input: ListEntryInput,
    ) -> Result<AddOutcome, ListError>;

    /// # Errors
    ///
    /// [`ListError::EntryNotFound`] before [`ListError::Forbidden`]: a missing
    /// entry is reported as such even to non-owners.
    async fn update(
        &self,
        user_id: i32,
        entry_id: i32,
        patch: ListEntryPatch,
    ) -> Result<ListEntry, ListError>;

    async fn delete(&self, user_id: i32, entry_id: i32) -> Result<(), ListError>;

    /// Entries joined with the cache; entries with no cache row are skipped.
    async fn entries(
        &self,
        user_id: i32,
        status: Option<ListStatus>,
    ) -> Result<Vec<ListEntryView>, ListError>;

    async fn stats(&self, user_id: i32) -> Result<ListStats, ListError>;

    async fn membership(&self, user_id: i32, anime_id: AnimeId)
    -> Result<ListMembership, ListError>;

    /// Another user's list by username. Deleted users are not found.
    async fn public_entries(&self, username: &str) -> Result<Vec<ListEntryView>, ListError>;
}
