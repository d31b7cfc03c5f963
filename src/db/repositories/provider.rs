use crate::entities::{prelude::*, watch_providers};
use crate::models::provider::{NewProvider, ProviderPatch, WatchProvider};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

pub struct ProviderRepository {
    conn: DatabaseConnection,
}

impl ProviderRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_anime(&self, anime_id: i32) -> Result<Vec<WatchProvider>> {
        let rows = WatchProviders::find()
            .filter(watch_providers::Column::AnimeId.eq(anime_id))
            .order_by_asc(watch_providers::Column::ProviderName)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(WatchProvider::from).collect())
    }

    pub async fn create(&self, provider: NewProvider) -> Result<WatchProvider> {
        let model = watch_providers::ActiveModel {
            id: Set(Uuid::new_v4()),
            anime_id: Set(provider.anime_id),
            provider_name: Set(provider.provider_name),
            provider_url: Set(provider.provider_url),
            region: Set(provider.region),
            is_sub: Set(provider.is_sub),
            is_dub: Set(provider.is_dub),
            last_updated: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&self.conn)
        .await?;

        Ok(WatchProvider::from(model))
    }

    /// `last_updated` only moves when the patch carries at least one field.
    pub async fn update(&self, id: Uuid, patch: ProviderPatch) -> Result<Option<WatchProvider>> {
        let Some(row) = WatchProviders::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(WatchProvider::from(row)));
        }

        let mut active: watch_providers::ActiveModel = row.into();
        if let Some(name) = patch.provider_name {
            active.provider_name = Set(name);
        }
        if let Some(url) = patch.provider_url {
            active.provider_url = Set(url);
        }
        if let Some(region) = patch.region {
            active.region = Set(Some(region));
        }
        if let Some(is_sub) = patch.is_sub {
            active.is_sub = Set(is_sub);
        }
        if let Some(is_dub) = patch.is_dub {
            active.is_dub = Set(is_dub);
        }
        active.last_updated = Set(chrono::Utc::now().to_rfc3339());

        let updated = active.update(&self.conn).await?;
        Ok(Some(WatchProvider::from(updated)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = WatchProviders::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
