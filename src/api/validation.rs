use uuid::Uuid;

use super::ApiError;
use crate::config::CatalogConfig;
use crate::domain::{AnimeId, Season};

pub const MAX_SCORE: i32 = 100;

/// Parses a path id; anything but a positive integer is a client error.
pub fn parse_id(raw: &str, what: &str) -> Result<i32, ApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!("Invalid {what} ID"))),
    }
}

pub fn parse_anime_id(raw: &str) -> Result<AnimeId, ApiError> {
    parse_id(raw, "anime").map(AnimeId::new)
}

pub fn parse_provider_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid provider ID format"))
}

pub fn parse_year(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation("Invalid year format"))
}

pub fn parse_season(raw: &str) -> Result<Season, ApiError> {
    raw.parse().map_err(|e: crate::domain::InvalidSeason| {
        ApiError::validation(e.to_string())
    })
}

pub fn validate_anime_id(id: i32) -> Result<AnimeId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid anime ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(AnimeId::new(id))
}

pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = query.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query is required"));
    }
    Ok(trimmed)
}

/// Resolves `page`/`perPage` against the catalog limits.
pub fn resolve_paging(
    page: Option<u32>,
    per_page: Option<u32>,
    default_per_page: u32,
    config: &CatalogConfig,
) -> Result<(u32, u32), ApiError> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::validation("page must be at least 1"));
    }

    let per_page = per_page.unwrap_or(default_per_page);
    if !(1..=config.max_per_page).contains(&per_page) {
        return Err(ApiError::validation(format!(
            "perPage must be between 1 and {}",
            config.max_per_page
        )));
    }

    Ok((page, per_page))
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(ApiError::validation(
            "Username must be between 3 and 32 characters",
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(username)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(trimmed),
        _ => Err(ApiError::validation("Invalid email address")),
    }
}

pub fn validate_score(score: Option<i32>) -> Result<Option<i32>, ApiError> {
    if let Some(score) = score
        && !(0..=MAX_SCORE).contains(&score)
    {
        return Err(ApiError::validation(format!(
            "Score must be between 0 and {MAX_SCORE}"
        )));
    }
    Ok(score)
}

pub fn validate_non_negative(value: i32, field: &str) -> Result<i32, ApiError> {
    if value < 0 {
        return Err(ApiError::validation(format!("{field} cannot be negative")));
    }
    Ok(value)
}

/// Two ASCII letters, returned upper-case.
pub fn validate_region(region: &str) -> Result<String, ApiError> {
    let trimmed = region.trim();
    if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::validation(
            "Region must be a two-letter country code",
        ));
    }
    Ok(trimmed.to_ascii_uppercase())
}

pub fn validate_required(value: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
