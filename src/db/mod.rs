use crate::config::SecurityConfig;
use crate::domain::ListStatus;
use crate::models::anime::AnimeSummary;
use crate::models::list::{ListEntry, ListEntryInput, ListEntryPatch};
use crate::models::provider::{NewProvider, ProviderPatch, WatchProvider};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

pub mod migrator;
pub mod repositories;

pub use repositories::user::{NewUser, User, UserWriteError};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

/// Filesystem path behind a SQLite URL, or `None` for in-memory databases.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let file_path = sqlite_file_path(db_url);

        if let Some(path_str) = file_path {
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // Every pooled connection to `:memory:` is its own database.
        if file_path.is_some() {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        } else {
            opt.max_connections(1).min_connections(1);
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn anime_cache_repo(&self) -> repositories::anime_cache::AnimeCacheRepository {
        repositories::anime_cache::AnimeCacheRepository::new(self.conn.clone())
    }

    fn anime_list_repo(&self) -> repositories::anime_list::AnimeListRepository {
        repositories::anime_list::AnimeListRepository::new(self.conn.clone())
    }

    fn provider_repo(&self) -> repositories::provider::ProviderRepository {
        repositories::provider::ProviderRepository::new(self.conn.clone())
    }

    // ========== User Repository Methods ==========

    pub async fn create_user(
        &self,
        new_user: NewUser,
        config: &SecurityConfig,
    ) -> Result<User, UserWriteError> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    // ========== Anime Cache Methods ==========

    pub async fn get_cached_anime(&self, id: i32) -> Result<Option<AnimeSummary>> {
        self.anime_cache_repo().get(id).await
    }

    pub async fn get_cached_animes(&self, ids: &[i32]) -> Result<Vec<AnimeSummary>> {
        self.anime_cache_repo().get_many(ids).await
    }

    pub async fn upsert_cached_anime(&self, summary: &AnimeSummary) -> Result<()> {
        self.anime_cache_repo().upsert(summary).await
    }

    // ========== List Methods ==========

    pub async fn get_list_entry(&self, id: i32) -> Result<Option<ListEntry>> {
        self.anime_list_repo().get(id).await
    }

    pub async fn find_list_entry(&self, user_id: i32, anime_id: i32) -> Result<Option<ListEntry>> {
        self.anime_list_repo().find_for_user(user_id, anime_id).await
    }

    pub async fn list_entries_for_user(
        &self,
        user_id: i32,
        status: Option<ListStatus>,
    ) -> Result<Vec<ListEntry>> {
        self.anime_list_repo().list_for_user(user_id, status).await
    }

    pub async fn upsert_list_entry(
        &self,
        user_id: i32,
        anime_id: i32,
        input: ListEntryInput,
    ) -> Result<(ListEntry, bool)> {
        self.anime_list_repo()
            .upsert_for_user(user_id, anime_id, input)
            .await
    }

    pub async fn patch_list_entry(&self, id: i32, patch: ListEntryPatch) -> Result<Option<ListEntry>> {
        self.anime_list_repo().apply_patch(id, patch).await
    }

    pub async fn delete_list_entry(&self, id: i32) -> Result<bool> {
        self.anime_list_repo().delete(id).await
    }

    // ========== Watch Provider Methods ==========

    pub async fn providers_for_anime(&self, anime_id: i32) -> Result<Vec<WatchProvider>> {
        self.provider_repo().list_for_anime(anime_id).await
    }

    pub async fn create_provider(&self, provider: NewProvider) -> Result<WatchProvider> {
        self.provider_repo().create(provider).await
    }

    pub async fn update_provider(
        &self,
        id: Uuid,
        patch: ProviderPatch,
    ) -> Result<Option<WatchProvider>> {
        self.provider_repo().update(id, patch).await
    }

    pub async fn delete_provider(&self, id: Uuid) -> Result<bool> {
        self.provider_repo().delete(id).await
    }
}
