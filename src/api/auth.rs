use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_email, validate_required, validate_username};
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::db::User;
use crate::services::{AuthError, SignupRequest};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct SignupBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub id: i32,
    pub username: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

/// The user resolved by [`auth_middleware`], available to protected handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    #[must_use]
    pub const fn id(&self) -> i32 {
        self.0.id
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid username or password".to_string())
            }
            AuthError::Unauthorized => Self::unauthorized(),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session cookie to a live user. Every failure is a bare 401
/// before the handler runs.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = &state.config().auth.cookie_name;

    let Some(token) = session_token(&headers, cookie_name) else {
        return ApiError::unauthorized().into_response();
    };

    match state.auth_service().authenticate(&token).await {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(AuthUser(user));
            next.run(request).await
        }
        Err(AuthError::Unauthorized) => ApiError::unauthorized().into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Session check failed");
            ApiError::unauthorized().into_response()
        }
    }
}

/// Value of the named cookie, if any `Cookie` header carries it.
fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .into_iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .flatten()
        .find(|c| c.name() == cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn session_cookie(state: &AppState, token: String, max_age: cookie::time::Duration) -> String {
    let config = state.config();
    Cookie::build(config.auth.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(config.server.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .finish()
        .to_string()
}

fn with_cookie<T: IntoResponse>(body: T, cookie: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::internal(format!("Invalid cookie header: {e}")))?;
    let mut response = body.into_response();
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupBody>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Json(payload) = payload?;

    let username = validate_username(payload.username.trim())?.to_string();
    let email = validate_email(&payload.email)?.to_string();
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let user = state
        .auth_service()
        .signup(SignupRequest {
            username,
            email,
            password: payload.password,
        })
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /login
/// Verifies credentials, sets the session cookie and also returns the token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;

    let username = validate_required(&payload.username, "Username")?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&username, &payload.password)
        .await?;

    let ttl = state.auth_service().session_ttl();
    let cookie = session_cookie(
        &state,
        result.token.clone(),
        cookie::time::Duration::seconds(ttl.num_seconds()),
    );

    let body = Json(ApiResponse::success(LoginResponse {
        id: result.user.id,
        username: result.user.username,
        token: result.token,
    }));

    with_cookie(body, &cookie)
}

/// POST /logout
/// Expires the session cookie. Tokens are not revoked server-side.
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let cookie = session_cookie(&state, String::new(), cookie::time::Duration::ZERO);
    let body = Json(ApiResponse::success(MessageResponse::new("Logged out")));
    with_cookie(body, &cookie)
}

/// GET /validate
pub async fn validate(Extension(user): Extension<AuthUser>) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(user.0)))
}

/// PUT /profile/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordBody>, JsonRejection>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let Json(payload) = payload?;

    state
        .auth_service()
        .change_password(user.id(), &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password changed successfully",
    ))))
}

/// DELETE /profile
/// Soft-deletes the account and clears the session cookie.
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    state.auth_service().delete_account(user.id()).await?;

    let cookie = session_cookie(&state, String::new(), cookie::time::Duration::ZERO);
    let body = Json(ApiResponse::success(MessageResponse::new("Account deleted")));
    with_cookie(body, &cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for c in cookies {
            headers.append(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        headers
    }

    #[test]
    fn finds_named_cookie_among_others() {
        let h = headers(&["theme=dark; Auth=abc.def.ghi; lang=en"]);
        assert_eq!(session_token(&h, "Auth").as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn finds_cookie_in_second_header() {
        let h = headers(&["theme=dark", "Auth=tok"]);
        assert_eq!(session_token(&h, "Auth").as_deref(), Some("tok"));
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        assert_eq!(session_token(&headers(&[]), "Auth"), None);
        assert_eq!(session_token(&headers(&["auth=tok"]), "Auth"), None);
        assert_eq!(session_token(&headers(&["Auth="]), "Auth"), None);
    }
}
