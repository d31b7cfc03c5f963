use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{parse_provider_id, validate_region, validate_required};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::provider::{ProviderPatch, WatchProvider};
use crate::services::ProviderError;

#[derive(Deserialize)]
pub struct UpdateProviderRequest {
    pub provider_name: Option<String>,
    pub provider_url: Option<String>,
    pub region: Option<String>,
    pub is_sub: Option<bool>,
    pub is_dub: Option<bool>,
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(_) => Self::NotFound(err.to_string()),
            ProviderError::Anime(inner) => inner.into(),
            ProviderError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// PUT /providers/{id}
pub async fn update_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProviderRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WatchProvider>>, ApiError> {
    let id = parse_provider_id(&id)?;
    let Json(payload) = payload?;

    let patch = ProviderPatch {
        provider_name: payload
            .provider_name
            .as_deref()
            .map(|n| validate_required(n, "Provider name"))
            .transpose()?,
        provider_url: payload
            .provider_url
            .as_deref()
            .map(|u| validate_required(u, "Provider URL"))
            .transpose()?,
        region: payload.region.as_deref().map(validate_region).transpose()?,
        is_sub: payload.is_sub,
        is_dub: payload.is_dub,
    };

    let provider = state.provider_service().update(id, patch).await?;
    Ok(Json(ApiResponse::success(provider)))
}

/// DELETE /providers/{id}
pub async fn delete_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_provider_id(&id)?;

    state.provider_service().delete(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Watch provider deleted successfully",
    ))))
}
