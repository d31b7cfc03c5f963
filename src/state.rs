use std::sync::Arc;

use crate::clients::{AnilistClient, CatalogClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AnimeService, AuthService, ListService, ProfileService, ProviderService, SeaOrmAnimeService,
    SeaOrmAuthService, SeaOrmListService, SeaOrmProfileService, SeaOrmProviderService,
    SessionTokens,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub anime_service: Arc<dyn AnimeService>,

    pub auth_service: Arc<dyn AuthService>,

    pub list_service: Arc<dyn ListService>,

    pub provider_service: Arc<dyn ProviderService>,

    pub profile_service: Arc<dyn ProfileService>,
}

impl SharedState {
    /// Connects the store and wires services against the AniList catalog.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = AnilistClient::new(&config.catalog)
            .map_err(|e| anyhow::anyhow!("Failed to build catalog client: {e}"))?;
        Self::with_catalog(config, Arc::new(catalog)).await
    }

    /// Same as [`SharedState::new`] with a caller-supplied catalog.
    pub async fn with_catalog(
        config: Config,
        catalog: Arc<dyn CatalogClient>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = SessionTokens::new(&config.auth);

        let anime_service = Arc::new(SeaOrmAnimeService::new(store.clone(), catalog.clone()))
            as Arc<dyn AnimeService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
            tokens,
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let list_service = Arc::new(SeaOrmListService::new(
            store.clone(),
            anime_service.clone(),
        )) as Arc<dyn ListService + Send + Sync + 'static>;

        let provider_service = Arc::new(SeaOrmProviderService::new(
            store.clone(),
            anime_service.clone(),
        )) as Arc<dyn ProviderService + Send + Sync + 'static>;

        let profile_service = Arc::new(SeaOrmProfileService::new(store.clone()))
            as Arc<dyn ProfileService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            anime_service,
            auth_service,
            list_service,
            provider_service,
            profile_service,
        })
    }
}
