use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::CatalogClient;
use crate::config::Config;
use crate::services::{AnimeService, AuthService, ListService, ProfileService, ProviderService};
use crate::state::SharedState;

mod anime;
mod anime_list;
pub mod auth;
mod error;
mod observability;
mod profile;
mod providers;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn anime_service(&self) -> &Arc<dyn AnimeService> {
        &self.shared.anime_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn list_service(&self) -> &Arc<dyn ListService> {
        &self.shared.list_service
    }

    #[must_use]
    pub fn provider_service(&self) -> &Arc<dyn ProviderService> {
        &self.shared.provider_service
    }

    #[must_use]
    pub fn profile_service(&self) -> &Arc<dyn ProfileService> {
        &self.shared.profile_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Builds state against a caller-supplied catalog. Metrics are disabled.
pub async fn create_app_state_with_catalog(
    config: Config,
    catalog: Arc<dyn CatalogClient>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_catalog(config, catalog).await?);
    Ok(create_app_state(shared, None))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config().server.cors_allowed_origins);

    let protected_routes = create_protected_router(state.clone());

    let app_router = Router::new()
        .merge(protected_routes)
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users/{username}/animelist", get(anime_list::public_list))
        .route("/anime/search", get(anime::search_anime))
        .route("/anime/popular", get(anime::popular_anime))
        .route("/anime/trending", get(anime::trending_anime))
        .route("/anime/recommendations", get(anime::recommendations))
        .route(
            "/anime/season/{year}/{season}",
            get(anime::seasonal_anime),
        )
        .route("/anime/{id}", get(anime::get_anime))
        .route("/metrics", get(observability::get_metrics))
        .with_state(state);

    app_router
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `"*"` anywhere in the list opens CORS to every origin; unparsable entries are skipped.
fn cors_layer(allowed: &[String]) -> CorsLayer {
    let origin = if allowed.iter().any(|entry| entry == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed
                .iter()
                .filter_map(|entry| HeaderValue::from_str(entry).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/validate", get(auth::validate))
        .route(
            "/profile",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(auth::delete_account),
        )
        .route("/profile/password", put(auth::change_password))
        .route("/anime/{id}/list-status", get(anime::list_status))
        .route("/anime/provider", post(anime::add_provider))
        .route(
            "/providers/{id}",
            put(providers::update_provider).delete(providers::delete_provider),
        )
        .route(
            "/animelist",
            get(anime_list::get_list).post(anime_list::add_to_list),
        )
        .route("/animelist/stats", get(anime_list::get_stats))
        .route(
            "/animelist/{id}",
            patch(anime_list::update_entry).delete(anime_list::delete_entry),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
