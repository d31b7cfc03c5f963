use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::{
    parse_anime_id, parse_season, parse_year, resolve_paging, validate_anime_id, validate_region,
    validate_required, validate_search_query,
};
use super::{ApiError, ApiResponse, AppState, PageMeta, PagedResponse};
use crate::models::anime::AnimeSummary;
use crate::models::list::ListMembership;
use crate::models::provider::{NewProvider, WatchProvider};
use crate::services::{AnimeDetailsView, AnimeError, Listing};

/// Recommendations default to a shorter page than the other listings.
const RECOMMENDATIONS_PER_PAGE: u32 = 10;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize)]
pub struct AddProviderRequest {
    pub anime_id: i32,
    pub provider_name: String,
    pub provider_url: String,
    pub region: Option<String>,
    #[serde(default)]
    pub is_sub: bool,
    #[serde(default)]
    pub is_dub: bool,
}

impl From<AnimeError> for ApiError {
    fn from(err: AnimeError) -> Self {
        match err {
            AnimeError::NotFound(_) => Self::NotFound("Anime not found".to_string()),
            err @ AnimeError::Upstream { .. } => Self::UpstreamError(err.to_string()),
            AnimeError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

async fn paged_listing(
    state: &AppState,
    listing: Listing,
    page: Option<u32>,
    per_page: Option<u32>,
    default_per_page: u32,
) -> Result<Json<PagedResponse<AnimeSummary>>, ApiError> {
    let (page, per_page) =
        resolve_paging(page, per_page, default_per_page, &state.config().catalog)?;

    let result = state
        .anime_service()
        .listing(listing, page, per_page)
        .await?;

    let meta = PageMeta::new(result.total, page, per_page);
    Ok(Json(PagedResponse::new(result.items, meta)))
}

/// GET /anime/search?q=&page=&perPage=
pub async fn search_anime(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<AnimeSummary>>, ApiError> {
    let Query(query) = query?;
    let q = validate_search_query(query.q.as_deref())?.to_string();

    let default_per_page = state.config().catalog.default_per_page;
    paged_listing(
        &state,
        Listing::Search(q),
        query.page,
        query.per_page,
        default_per_page,
    )
    .await
}

/// GET /anime/popular
pub async fn popular_anime(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<AnimeSummary>>, ApiError> {
    let Query(query) = query?;
    let default_per_page = state.config().catalog.default_per_page;
    paged_listing(
        &state,
        Listing::Popular,
        query.page,
        query.per_page,
        default_per_page,
    )
    .await
}

/// GET /anime/trending
pub async fn trending_anime(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<AnimeSummary>>, ApiError> {
    let Query(query) = query?;
    let default_per_page = state.config().catalog.default_per_page;
    paged_listing(
        &state,
        Listing::Trending,
        query.page,
        query.per_page,
        default_per_page,
    )
    .await
}

/// GET /anime/season/{year}/{season}
pub async fn seasonal_anime(
    State(state): State<Arc<AppState>>,
    Path((year, season)): Path<(String, String)>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<AnimeSummary>>, ApiError> {
    let year = parse_year(&year)?;
    let season = parse_season(&season)?;
    let Query(query) = query?;

    let default_per_page = state.config().catalog.default_per_page;
    paged_listing(
        &state,
        Listing::Season { year, season },
        query.page,
        query.per_page,
        default_per_page,
    )
    .await
}

/// GET /anime/recommendations
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PagedResponse<AnimeSummary>>, ApiError> {
    let Query(query) = query?;
    paged_listing(
        &state,
        Listing::Recommendations,
        query.page,
        query.per_page,
        RECOMMENDATIONS_PER_PAGE,
    )
    .await
}

/// GET /anime/{id}
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AnimeDetailsView>>, ApiError> {
    let id = parse_anime_id(&id)?;
    let details = state.anime_service().details(id).await?;
    Ok(Json(ApiResponse::success(details)))
}

/// GET /anime/{id}/list-status
pub async fn list_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ListMembership>>, ApiError> {
    let id = parse_anime_id(&id)?;
    let membership = state.list_service().membership(user.id(), id).await?;
    Ok(Json(ApiResponse::success(membership)))
}

/// POST /anime/provider
pub async fn add_provider(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddProviderRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WatchProvider>>, ApiError> {
    let Json(payload) = payload?;

    let anime_id = validate_anime_id(payload.anime_id)?;
    let provider_name = validate_required(&payload.provider_name, "Provider name")?;
    let provider_url = validate_required(&payload.provider_url, "Provider URL")?;
    let region = payload
        .region
        .as_deref()
        .map(validate_region)
        .transpose()?;

    let provider = state
        .provider_service()
        .add(NewProvider {
            anime_id: anime_id.value(),
            provider_name,
            provider_url,
            region,
            is_sub: payload.is_sub,
            is_dub: payload.is_dub,
        })
        .await?;

    Ok(Json(ApiResponse::success(provider)))
}
