use crate::clients::{CatalogClient, CatalogError};
use crate::config::CatalogConfig;
use crate::domain::{AnimeId, Season};
use crate::models::anime::{AnimeDetails, CatalogPage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const MEDIA_BY_ID_QUERY: &str = r"
    query ($id: Int) {
        Media(id: $id, type: ANIME) {
            id
            title { romaji english native }
            description
            format
            status
            episodes
            duration
            genres
            startDate { year month day }
            endDate { year month day }
            season
            seasonYear
            coverImage { large medium }
            bannerImage
            averageScore
            popularity
            studios { nodes { name } }
        }
    }
";

/// Shared by every listing; variables omitted from a request count as absent arguments.
const PAGE_QUERY: &str = r"
    query ($page: Int, $perPage: Int, $sort: [MediaSort], $search: String, $season: MediaSeason, $seasonYear: Int) {
        Page(page: $page, perPage: $perPage) {
            pageInfo { total currentPage lastPage hasNextPage }
            media(type: ANIME, sort: $sort, search: $search, season: $season, seasonYear: $seasonYear) {
                id
                title { romaji english native }
                coverImage { large medium }
                format
                episodes
            }
        }
    }
";

#[derive(Serialize)]
struct GraphQLRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
}

#[derive(Serialize)]
struct IdVariables {
    id: i32,
}

#[derive(Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<AnimeDetails>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageVariables<'a> {
    page: u32,
    per_page: u32,
    sort: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    season: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    season_year: Option<i32>,
}

#[derive(Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Page,
}

#[derive(Deserialize)]
struct Page {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    #[serde(default)]
    media: Vec<AnimeDetails>,
}

#[derive(Deserialize)]
struct PageInfo {
    total: Option<u64>,
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// GraphQL client for AniList.
#[derive(Clone)]
pub struct AnilistClient {
    client: Client,
    api_url: String,
}

impl AnilistClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// POSTs one query. `Ok(None)` means the catalog answered 404.
    async fn execute<V, T>(
        &self,
        operation: &'static str,
        query: &str,
        variables: V,
    ) -> Result<Option<T>, CatalogError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let start = Instant::now();
        let result = self.send(query, variables).await;

        let outcome = match &result {
            Ok(Some(_)) => "success",
            Ok(None) => "not_found",
            Err(_) => "error",
        };
        metrics::counter!(
            "catalog_requests_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("catalog_request_duration_seconds", "operation" => operation)
            .record(start.elapsed().as_secs_f64());

        debug!(
            operation,
            outcome,
            duration_ms = saturating_millis(start.elapsed()),
            "Catalog request finished"
        );

        result
    }

    async fn send<V, T>(&self, query: &str, variables: V) -> Result<Option<T>, CatalogError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQLResponse<T> =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;

        Ok(parsed.data)
    }

    async fn page(
        &self,
        operation: &'static str,
        variables: PageVariables<'_>,
    ) -> Result<CatalogPage, CatalogError> {
        let data: Option<PageData> = self.execute(operation, PAGE_QUERY, variables).await?;
        let page = data
            .ok_or_else(|| CatalogError::Decode("response has no Page".to_string()))?
            .page;

        Ok(CatalogPage {
            total: page.page_info.total.unwrap_or(0),
            items: page.media.iter().map(AnimeDetails::to_summary).collect(),
        })
    }
}

#[async_trait]
impl CatalogClient for AnilistClient {
    async fn fetch_by_id(&self, id: AnimeId) -> Result<Option<AnimeDetails>, CatalogError> {
        let data: Option<MediaData> = self
            .execute(
                "fetch_by_id",
                MEDIA_BY_ID_QUERY,
                IdVariables { id: id.value() },
            )
            .await?;

        Ok(data.and_then(|d| d.media))
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, CatalogError> {
        self.page(
            "search",
            PageVariables {
                page,
                per_page,
                sort: ["POPULARITY_DESC"],
                search: Some(query),
                season: None,
                season_year: None,
            },
        )
        .await
    }

    async fn popular(&self, page: u32, per_page: u32) -> Result<CatalogPage, CatalogError> {
        self.page(
            "popular",
            PageVariables {
                page,
                per_page,
                sort: ["POPULARITY_DESC"],
                search: None,
                season: None,
                season_year: None,
            },
        )
        .await
    }

    async fn trending(&self, page: u32, per_page: u32) -> Result<CatalogPage, CatalogError> {
        self.page(
            "trending",
            PageVariables {
                page,
                per_page,
                sort: ["TRENDING_DESC"],
                search: None,
                season: None,
                season_year: None,
            },
        )
        .await
    }

    async fn by_season(
        &self,
        year: i32,
        season: Season,
        page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, CatalogError> {
        self.page(
            "by_season",
            PageVariables {
                page,
                per_page,
                sort: ["POPULARITY_DESC"],
                search: None,
                season: Some(season.as_str()),
                season_year: Some(year),
            },
        )
        .await
    }
}
