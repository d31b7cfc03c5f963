use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::validate_email;
use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::services::{ProfileError, ProfileUpdate};

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(_) => Self::NotFound("User not found".to_string()),
            ProfileError::Conflict(msg) => Self::Conflict(msg),
            ProfileError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let profile = state.profile_service().get(user.id()).await?;
    Ok(Json(ApiResponse::success(profile.into())))
}

/// PUT /profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Json(payload) = payload?;

    let email = payload
        .email
        .as_deref()
        .map(validate_email)
        .transpose()?
        .map(str::to_string);

    let profile_picture = payload.profile_picture.map(|p| p.trim().to_string());

    let updated = state
        .profile_service()
        .update(
            user.id(),
            ProfileUpdate {
                email,
                profile_picture,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated.into())))
}
