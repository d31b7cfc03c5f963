//! `SeaORM` implementation of the `ListService` trait.

use crate::db::Store;
use crate::domain::{AnimeId, ListStatus};
use crate::models::list::{
    ListEntry, ListEntryInput, ListEntryPatch, ListEntryView, ListMembership, ListStats,
};
use crate::services::anime_service::AnimeService;
use crate::services::list_service::{AddOutcome, ListError, ListService};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmListService {
    store: Store,
    anime: Arc<dyn AnimeService>,
}

impl SeaOrmListService {
    #[must_use]
    pub fn new(store: Store, anime: Arc<dyn AnimeService>) -> Self {
        Self { store, anime }
    }

    /// Loads the entry and checks it belongs to `user_id`.
    async fn owned_entry(&self, user_id: i32, entry_id: i32) -> Result<ListEntry, ListError> {
        let entry = self
            .store
            .get_list_entry(entry_id)
            .await?
            .ok_or(ListError::EntryNotFound(entry_id))?;

        if entry.user_id != user_id {
            return Err(ListError::Forbidden(entry_id));
        }

        Ok(entry)
    }

    async fn join_with_cache(
        &self,
        entries: Vec<ListEntry>,
    ) -> Result<Vec<ListEntryView>, ListError> {
        let ids: Vec<i32> = entries.iter().map(|e| e.anime_id).collect();
        let cached: HashMap<i32, _> = self
            .store
            .get_cached_animes(&ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(entries
            .into_iter()
            .filter_map(|entry| {
                let anime = cached.get(&entry.anime_id)?.clone();
                Some(ListEntryView::new(entry, anime))
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl ListService for SeaOrmListService {
    async fn add(
        &self,
        user_id: i32,
        anime_id: AnimeId,
        input: ListEntryInput,
    ) -> Result<AddOutcome, ListError> {
        self.anime.ensure_cached(anime_id).await?;

        let (entry, created) = self
            .store
            .upsert_list_entry(user_id, anime_id.value(), input)
            .await?;

        info!(
            user_id,
            anime_id = %anime_id,
            entry_id = entry.id,
            created,
            "List entry saved"
        );

        Ok(AddOutcome { entry, created })
    }

    async fn update(
        &self,
        user_id: i32,
        entry_id: i32,
        patch: ListEntryPatch,
    ) -> Result<ListEntry, ListError> {
        self.owned_entry(user_id, entry_id).await?;

        self.store
            .patch_list_entry(entry_id, patch)
            .await?
            .ok_or(ListError::EntryNotFound(entry_id))
    }

    async fn delete(&self, user_id: i32, entry_id: i32) -> Result<(), ListError> {
        self.owned_entry(user_id, entry_id).await?;

        if !self.store.delete_list_entry(entry_id).await? {
            return Err(ListError::EntryNotFound(entry_id));
        }

        info!(user_id, entry_id, "List entry deleted");
        Ok(())
    }

    async fn entries(
        &self,
        user_id: i32,
        status: Option<ListStatus>,
    ) -> Result<Vec<ListEntryView>, ListError> {
        let entries = self.store.list_entries_for_user(user_id, status).await?;
        self.join_with_cache(entries).await
    }

    async fn stats(&self, user_id: i32) -> Result<ListStats, ListError> {
        let entries = self.store.list_entries_for_user(user_id, None).await?;
        Ok(ListStats::aggregate(entries.iter().map(ListEntry::stats_input)))
    }

    async fn membership(
        &self,
        user_id: i32,
        anime_id: AnimeId,
    ) -> Result<ListMembership, ListError> {
        let entry = self.store.find_list_entry(user_id, anime_id.value()).await?;
        Ok(entry.as_ref().map_or_else(ListMembership::absent, ListMembership::of))
    }

    async fn public_entries(&self, username: &str) -> Result<Vec<ListEntryView>, ListError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ListError::UserNotFound(username.to_string()))?;

        let entries = self.store.list_entries_for_user(user.id, None).await?;
        self.join_with_cache(entries).await
    }
}
