//! Domain service for crowd-sourced watch providers.

use crate::models::provider::{NewProvider, ProviderPatch, WatchProvider};
use crate::services::anime_service::AnimeError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Watch provider not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Anime(#[from] AnimeError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait ProviderService: Send + Sync {
    /// Stores a provider, hydrating the title into the cache if unseen.
    async fn add(&self, provider: NewProvider) -> Result<WatchProvider, ProviderError>;

    /// Applies the present fields; `last_updated` moves only if any were present.
    async fn update(&self, id: Uuid, patch: ProviderPatch)
    -> Result<WatchProvider, ProviderError>;

    async fn delete(&self, id: Uuid) -> Result<(), ProviderError>;
}
