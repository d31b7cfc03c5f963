//! Domain service for catalog-backed anime lookups.
//!
//! Listings are passed straight through from the catalog. Detail lookups
//! refresh the local cache on every call.

use crate::clients::CatalogError;
use crate::domain::{AnimeId, Season};
use crate::models::anime::{AnimeDetails, AnimeSummary, CatalogPage};
use crate::models::provider::WatchProvider;
use serde::Serialize;
use thiserror::Error;

/// Domain errors for anime operations.
#[derive(Debug, Error)]
pub enum AnimeError {
    #[error("Anime not found: {0}")]
    NotFound(AnimeId),

    /// `action` reads like "Failed to search anime".
    #[error("{action}: {source}")]
    Upstream {
        action: &'static str,
        #[source]
        source: CatalogError,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for AnimeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnimeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Detail view: full catalog payload plus known watch providers.
#[derive(Debug, Clone, Serialize)]
pub struct AnimeDetailsView {
    pub anime: AnimeDetails,
    pub providers: Vec<WatchProvider>,
}

/// Which catalog listing to page through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Search(String),
    Popular,
    Trending,
    Season { year: i32, season: Season },
    /// Backed by the popular listing until real recommendations exist.
    Recommendations,
}

impl Listing {
    #[must_use]
    pub const fn failure_action(&self) -> &'static str {
        match self {
            Self::Search(_) => "Failed to search anime",
            Self::Popular => "Failed to fetch popular anime",
            Self::Trending => "Failed to fetch trending anime",
            Self::Season { .. } => "Failed to fetch anime by season",
            Self::Recommendations => "Failed to fetch recommendations",
        }
    }
}

/// Domain service trait for anime operations.
#[async_trait::async_trait]
pub trait AnimeService: Send + Sync {
    /// Fetches the full record from the catalog, refreshes the cache and
    /// attaches the stored watch providers.
    ///
    /// # Errors
    ///
    /// - [`AnimeError::NotFound`] if the catalog has no such title
    /// - [`AnimeError::Upstream`] on any other catalog failure
    async fn details(&self, id: AnimeId) -> Result<AnimeDetailsView, AnimeError>;

    /// One page of a catalog listing.
    async fn listing(
        &self,
        listing: Listing,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, AnimeError>;

    /// Returns the cached projection, fetching from the catalog on a miss.
    async fn ensure_cached(&self, id: AnimeId) -> Result<AnimeSummary, AnimeError>;
}
