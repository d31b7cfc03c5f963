//! `SeaORM` implementation of the `ProviderService` trait.

use crate::db::Store;
use crate::domain::AnimeId;
use crate::models::provider::{NewProvider, ProviderPatch, WatchProvider};
use crate::services::anime_service::AnimeService;
use crate::services::provider_service::{ProviderError, ProviderService};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct SeaOrmProviderService {
    store: Store,
    anime: Arc<dyn AnimeService>,
}

impl SeaOrmProviderService {
    #[must_use]
    pub fn new(store: Store, anime: Arc<dyn AnimeService>) -> Self {
        Self { store, anime }
    }
}

#[async_trait::async_trait]
impl ProviderService for SeaOrmProviderService {
    async fn add(&self, provider: NewProvider) -> Result<WatchProvider, ProviderError> {
        self.anime
            .ensure_cached(AnimeId::new(provider.anime_id))
            .await?;

        let created = self.store.create_provider(provider).await?;
        info!(
            provider_id = %created.id,
            anime_id = created.anime_id,
            provider = %created.provider_name,
            "Watch provider added"
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ProviderPatch,
    ) -> Result<WatchProvider, ProviderError> {
        self.store
            .update_provider(id, patch)
            .await?
            .ok_or(ProviderError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ProviderError> {
        if !self.store.delete_provider(id).await? {
            return Err(ProviderError::NotFound(id));
        }
        info!(provider_id = %id, "Watch provider deleted");
        Ok(())
    }
}
