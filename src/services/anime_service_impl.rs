//! `SeaORM` implementation of the `AnimeService` trait.

use crate::clients::CatalogClient;
use crate::db::Store;
use crate::domain::AnimeId;
use crate::models::anime::{AnimeSummary, CatalogPage};
use crate::services::anime_service::{AnimeDetailsView, AnimeError, AnimeService, Listing};
use std::sync::Arc;
use tracing::debug;

pub struct SeaOrmAnimeService {
    store: Store,
    catalog: Arc<dyn CatalogClient>,
}

impl SeaOrmAnimeService {
    #[must_use]
    pub fn new(store: Store, catalog: Arc<dyn CatalogClient>) -> Self {
        Self { store, catalog }
    }
}

#[async_trait::async_trait]
impl AnimeService for SeaOrmAnimeService {
    async fn details(&self, id: AnimeId) -> Result<AnimeDetailsView, AnimeError> {
        let anime = self
            .catalog
            .fetch_by_id(id)
            .await
            .map_err(|source| AnimeError::Upstream {
                action: "Failed to fetch anime details",
                source,
            })?
            .ok_or(AnimeError::NotFound(id))?;

        self.store.upsert_cached_anime(&anime.to_summary()).await?;

        let providers = self.store.providers_for_anime(id.value()).await?;

        Ok(AnimeDetailsView { anime, providers })
    }

    async fn listing(
        &self,
        listing: Listing,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, AnimeError> {
        let action = listing.failure_action();

        let result = match &listing {
            Listing::Search(query) => self.catalog.search(query, page, per_page).await,
            Listing::Popular | Listing::Recommendations => {
                self.catalog.popular(page, per_page).await
            }
            Listing::Trending => self.catalog.trending(page, per_page).await,
            Listing::Season { year, season } => {
                self.catalog.by_season(*year, *season, page, per_page).await
            }
        };

        result.map_err(|source| AnimeError::Upstream { action, source })
    }

    async fn ensure_cached(&self, id: AnimeId) -> Result<AnimeSummary, AnimeError> {
        if let Some(cached) = self.store.get_cached_anime(id.value()).await? {
            return Ok(cached);
        }

        debug!(anime_id = %id, "Cache miss, fetching from catalog");

        let details = self
            .catalog
            .fetch_by_id(id)
            .await
            .map_err(|source| AnimeError::Upstream {
                action: "Failed to fetch anime",
                source,
            })?
            .ok_or(AnimeError::NotFound(id))?;

        let summary = details.to_summary();
        self.store.upsert_cached_anime(&summary).await?;

        Ok(summary)
    }
}
