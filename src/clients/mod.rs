pub mod anilist;

pub use anilist::AnilistClient;

use crate::domain::{AnimeId, Season};
use crate::models::anime::{AnimeDetails, CatalogPage};
use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the external catalog. Callers treat all variants as one
/// opaque upstream error; the variants only improve the message.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse catalog response: {0}")]
    Decode(String),
}

/// Read-only access to the anime catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// `Ok(None)` when the catalog has no such title.
    async fn fetch_by_id(&self, id: AnimeId) -> Result<Option<AnimeDetails>, CatalogError>;

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, CatalogError>;

    async fn popular(&self, page: u32, per_page: u32) -> Result<CatalogPage, CatalogError>;

    async fn trending(&self, page: u32, per_page: u32) -> Result<CatalogPage, CatalogError>;

    async fn by_season(
        &self,
        year: i32,
        season: Season,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, CatalogError>;
}
