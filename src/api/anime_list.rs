use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::{parse_id, validate_anime_id, validate_non_negative, validate_score};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::ListStatus;
use crate::models::list::{ListEntry, ListEntryInput, ListEntryPatch, ListEntryView, ListStats};
use crate::services::ListError;

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct AddEntryRequest {
    pub anime_id: Option<i32>,
    pub status: Option<String>,
    pub score: Option<i32>,
    #[serde(default)]
    pub progress: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub rewatch_count: i32,
}

/// Only present fields change. `null` and absent are the same thing.
#[derive(Deserialize)]
pub struct UpdateEntryRequest {
    pub status: Option<String>,
    pub score: Option<i32>,
    pub progress: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub rewatch_count: Option<i32>,
}

#[derive(Serialize)]
pub struct EntryResponse {
    pub message: String,
    pub entry: ListEntry,
}

impl From<ListError> for ApiError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::EntryNotFound(_) => Self::NotFound(err.to_string()),
            ListError::Forbidden(_) => Self::Forbidden(err.to_string()),
            ListError::UserNotFound(_) => Self::NotFound("User not found".to_string()),
            ListError::Anime(inner) => inner.into(),
            ListError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

fn parse_status(raw: &str) -> Result<ListStatus, ApiError> {
    raw.parse()
        .map_err(|e: crate::domain::InvalidListStatus| ApiError::validation(e.to_string()))
}

/// GET /animelist?status=
pub async fn get_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<StatusFilter>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<ListEntryView>>>, ApiError> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;

    let entries = state.list_service().entries(user.id(), status).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// POST /animelist
/// Adds a title or overwrites the caller's existing entry for it.
pub async fn add_to_list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<AddEntryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EntryResponse>>, ApiError> {
    let Json(payload) = payload?;

    let anime_id = payload
        .anime_id
        .ok_or_else(|| ApiError::validation("anime_id is required"))?;
    let anime_id = validate_anime_id(anime_id)?;

    let status = payload
        .status
        .as_deref()
        .ok_or_else(|| ApiError::validation("status is required"))
        .and_then(parse_status)?;

    let input = ListEntryInput {
        status,
        score: validate_score(payload.score)?,
        progress: validate_non_negative(payload.progress, "Progress")?,
        start_date: payload.start_date,
        end_date: payload.end_date,
        notes: payload.notes,
        rewatch_count: validate_non_negative(payload.rewatch_count, "Rewatch count")?,
    };

    let outcome = state.list_service().add(user.id(), anime_id, input).await?;

    let message = if outcome.created {
        "Anime added to list"
    } else {
        "List entry updated"
    };

    Ok(Json(ApiResponse::success(EntryResponse {
        message: message.to_string(),
        entry: outcome.entry,
    })))
}

/// PATCH /animelist/{id}
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EntryResponse>>, ApiError> {
    let entry_id = parse_id(&id, "entry")?;
    let Json(payload) = payload?;

    let patch = ListEntryPatch {
        status: payload.status.as_deref().map(parse_status).transpose()?,
        score: validate_score(payload.score)?,
        progress: payload
            .progress
            .map(|p| validate_non_negative(p, "Progress"))
            .transpose()?,
        start_date: payload.start_date,
        end_date: payload.end_date,
        notes: payload.notes,
        rewatch_count: payload
            .rewatch_count
            .map(|r| validate_non_negative(r, "Rewatch count"))
            .transpose()?,
    };

    let entry = state
        .list_service()
        .update(user.id(), entry_id, patch)
        .await?;

    Ok(Json(ApiResponse::success(EntryResponse {
        message: "Entry updated successfully".to_string(),
        entry,
    })))
}

/// DELETE /animelist/{id}
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let entry_id = parse_id(&id, "entry")?;

    state.list_service().delete(user.id(), entry_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Entry deleted successfully",
    ))))
}

/// GET /animelist/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<ListStats>>, ApiError> {
    let stats = state.list_service().stats(user.id()).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /users/{username}/animelist
/// Public, read-only view of another user's list.
pub async fn public_list(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<ListEntryView>>>, ApiError> {
    let entries = state.list_service().public_entries(&username).await?;
    Ok(Json(ApiResponse::success(entries)))
}
