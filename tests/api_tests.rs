use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tower::ServiceExt;
use wawatch::clients::{CatalogClient, CatalogError};
use wawatch::config::Config;
use wawatch::domain::{AnimeId, Season};
use wawatch::models::anime::{AnimeDetails, AnimeSummary, AnimeTitle, CatalogPage, CoverImage};

/// Ids the fake catalog knows. 500 always fails upstream.
const BEBOP: i32 = 1;
const UNNAMED: i32 = 2;
const FRIEREN: i32 = 3;
const BROKEN: i32 = 500;

/// Counts detail fetches. With `renamed` set, English titles gain a suffix,
/// standing in for an upstream edit.
#[derive(Default)]
struct FakeCatalog {
    fetches: AtomicUsize,
    renamed: AtomicBool,
}

impl FakeCatalog {
    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

fn details(id: i32) -> Option<AnimeDetails> {
    let (romaji, english, episodes) = match id {
        BEBOP => ("Cowboy Bebop", Some("Cowboy Bebop EN"), Some(26)),
        UNNAMED => ("Romaji Only", Some(""), None),
        FRIEREN => ("Sousou no Frieren", None, Some(28)),
        _ => return None,
    };

    Some(AnimeDetails {
        id,
        title: AnimeTitle {
            romaji: Some(romaji.to_string()),
            english: english.map(str::to_string),
            native: None,
        },
        format: Some("TV".to_string()),
        episodes,
        cover_image: CoverImage {
            large: Some(format!("https://img.example/{id}.jpg")),
            medium: None,
        },
        ..AnimeDetails::default()
    })
}

fn page(total: u64, per_page: u32) -> CatalogPage {
    let items = [BEBOP, UNNAMED, FRIEREN]
        .into_iter()
        .filter_map(details)
        .map(|d| d.to_summary())
        .take(per_page as usize)
        .collect::<Vec<AnimeSummary>>();
    CatalogPage { items, total }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_by_id(&self, id: AnimeId) -> Result<Option<AnimeDetails>, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if id.value() == BROKEN {
            return Err(CatalogError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        let mut found = details(id.value());
        if self.renamed.load(Ordering::SeqCst)
            && let Some(english) = found.as_mut().and_then(|d| d.title.english.as_mut())
        {
            english.push_str(" (Remastered)");
        }
        Ok(found)
    }

    async fn search(
        &self,
        query: &str,
        _page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, CatalogError> {
        if query == "nothing" {
            return Ok(CatalogPage::default());
        }
        Ok(page(45, per_page))
    }

    async fn popular(&self, _page: u32, per_page: u32) -> Result<CatalogPage, CatalogError> {
        Ok(page(100, per_page))
    }

    async fn trending(&self, _page: u32, _per_page: u32) -> Result<CatalogPage, CatalogError> {
        Err(CatalogError::Decode("unexpected payload".to_string()))
    }

    async fn by_season(
        &self,
        _year: i32,
        _season: Season,
        _page: u32,
        per_page: u32,
    ) -> Result<CatalogPage, CatalogError> {
        Ok(page(3, per_page))
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config.observability.metrics_enabled = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config
}

async fn spawn_app() -> Router {
    spawn_app_with(Arc::new(FakeCatalog::default())).await
}

async fn spawn_app_with(catalog: Arc<FakeCatalog>) -> Router {
    let state = wawatch::api::create_app_state_with_catalog(test_config(), catalog)
        .await
        .expect("Failed to create app state");
    wawatch::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json, set_cookie)
}

/// Signs up and logs in; returns the `Cookie` header value for later calls.
async fn login_as(app: &Router, username: &str) -> String {
    let (status, _, _) = send(
        app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, set_cookie) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"username": username, "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    let set_cookie = set_cookie.expect("login sets a cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_signup_and_login() {
    let app = spawn_app().await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "alice", "email": "alice@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password").is_none());

    let (status, body, _) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "alice", "email": "other@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "bob", "email": "alice@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({"username": "carol", "email": "carol@example.com", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "wrong password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body, set_cookie) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    let set_cookie = set_cookie.unwrap();
    assert!(set_cookie.starts_with("Auth="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=2592000"));

    let cookie = set_cookie.split(';').next().unwrap();
    let (status, body, _) = send(&app, "GET", "/validate", Some(cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_protected_routes_reject_bad_sessions() {
    let app = spawn_app().await;

    let (status, body, _) = send(&app, "GET", "/animelist", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _, _) = send(&app, "GET", "/validate", Some("Auth=not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let now = chrono::Utc::now().timestamp();
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &wawatch::services::Claims {
            sub: "1".to_string(),
            exp: now - 60,
            iat: now - 120,
        },
        &jsonwebtoken::EncodingKey::from_secret(wawatch::config::DEV_JWT_SECRET.as_bytes()),
    )
    .unwrap();
    let cookie = format!("Auth={expired}");
    let (status, _, _) = send(&app, "GET", "/validate", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid signature, but no such user.
    let ghost = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &wawatch::services::Claims {
            sub: "9999".to_string(),
            exp: now + 3600,
            iat: now,
        },
        &jsonwebtoken::EncodingKey::from_secret(wawatch::config::DEV_JWT_SECRET.as_bytes()),
    )
    .unwrap();
    let cookie = format!("Auth={ghost}");
    let (status, _, _) = send(&app, "GET", "/validate", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = spawn_app().await;

    let (status, _, set_cookie) = send(&app, "POST", "/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = set_cookie.unwrap();
    assert!(set_cookie.starts_with("Auth=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_add_to_list_overwrites_existing_entry() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/animelist",
        Some(&cookie),
        Some(json!({"anime_id": BEBOP, "status": "WATCHING", "score": 80, "progress": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Anime added to list");
    let entry_id = body["data"]["entry"]["id"].as_i64().unwrap();

    let (status, body, _) = send(
        &app,
        "POST",
        "/animelist",
        Some(&cookie),
        Some(json!({"anime_id": BEBOP, "status": "COMPLETED", "progress": 26})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "List entry updated");
    assert_eq!(body["data"]["entry"]["id"].as_i64().unwrap(), entry_id);
    assert_eq!(body["data"]["entry"]["status"], "COMPLETED");
    assert_eq!(body["data"]["entry"]["score"], Value::Null);

    let (status, body, _) = send(&app, "GET", "/animelist", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["anime"]["title"], "Cowboy Bebop EN");
    assert_eq!(entries[0]["anime"]["total_episodes"], 26);
}

#[tokio::test]
async fn test_add_to_list_validation() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    let cases = [
        json!({"anime_id": BEBOP, "status": "ON_HOLD"}),
        json!({"anime_id": BEBOP}),
        json!({"status": "WATCHING"}),
        json!({"anime_id": 0, "status": "WATCHING"}),
        json!({"anime_id": BEBOP, "status": "WATCHING", "score": 101}),
        json!({"anime_id": BEBOP, "status": "WATCHING", "progress": -1}),
    ];

    for case in cases {
        let (status, body, _) = send(&app, "POST", "/animelist", Some(&cookie), Some(case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    let (status, body, _) = send(
        &app,
        "POST",
        "/animelist",
        Some(&cookie),
        Some(json!({"anime_id": 404, "status": "WATCHING"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Anime not found");

    let (status, _, _) = send(&app, "GET", "/animelist?status=bogus", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_entry_ownership() {
    let app = spawn_app().await;
    let alice = login_as(&app, "alice").await;
    let bob = login_as(&app, "bob").await;

    let (_, body, _) = send(
        &app,
        "POST",
        "/animelist",
        Some(&alice),
        Some(json!({"anime_id": BEBOP, "status": "WATCHING"})),
    )
    .await;
    let entry_id = body["data"]["entry"]["id"].as_i64().unwrap();
    let uri = format!("/animelist/{entry_id}");

    let (status, body, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&bob),
        Some(json!({"progress": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to modify this entry");

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, "PATCH", "/animelist/9999", Some(&bob), Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, "DELETE", "/animelist/abc", Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&alice),
        Some(json!({"progress": 7, "notes": "great"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["entry"]["progress"], 7);
    assert_eq!(body["data"]["entry"]["notes"], "great");
    assert_eq!(body["data"]["entry"]["status"], "WATCHING");

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_stats() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    let (status, body, _) = send(&app, "GET", "/animelist/stats", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_anime"], 0);
    assert_eq!(body["data"]["mean_score"], 0.0);
    assert_eq!(body["data"]["status_counts"].as_object().unwrap().len(), 6);

    for (id, status, score, progress) in [
        (BEBOP, "COMPLETED", Some(8), 26),
        (UNNAMED, "WATCHING", Some(9), 4),
        (FRIEREN, "PLANNED", None, 0),
    ] {
        let (code, _, _) = send(
            &app,
            "POST",
            "/animelist",
            Some(&cookie),
            Some(json!({"anime_id": id, "status": status, "score": score, "progress": progress})),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
    }

    let (_, body, _) = send(&app, "GET", "/animelist/stats", Some(&cookie), None).await;
    let stats = &body["data"];
    assert_eq!(stats["total_anime"], 3);
    assert_eq!(stats["episodes_watched"], 30);
    assert_eq!(stats["scored_entries"], 2);
    assert!((stats["mean_score"].as_f64().unwrap() - 8.5).abs() < 1e-9);
    assert_eq!(stats["status_counts"]["COMPLETED"], 1);
    assert_eq!(stats["status_counts"]["DROPPED"], 0);

    let (_, body, _) = send(&app, "GET", "/animelist?status=PLANNED", Some(&cookie), None).await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["anime"]["id"], FRIEREN);
}

#[tokio::test]
async fn test_list_status_membership() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    let uri = format!("/anime/{BEBOP}/list-status");
    let (status, body, _) = send(&app, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({"in_list": false}));

    send(
        &app,
        "POST",
        "/animelist",
        Some(&cookie),
        Some(json!({"anime_id": BEBOP, "status": "PAUSED", "progress": 2})),
    )
    .await;

    let (_, body, _) = send(&app, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(
        body["data"],
        json!({"in_list": true, "status": "PAUSED", "progress": 2, "score": null})
    );
}

#[tokio::test]
async fn test_public_list() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    send(
        &app,
        "POST",
        "/animelist",
        Some(&cookie),
        Some(json!({"anime_id": UNNAMED, "status": "WATCHING"})),
    )
    .await;

    let (status, body, _) = send(&app, "GET", "/users/alice/animelist", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["anime"]["title"], "Romaji Only");
    assert_eq!(entries[0]["anime"]["total_episodes"], Value::Null);

    let (status, _, _) = send(&app, "GET", "/users/nobody/animelist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_account_is_locked_out() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    let (status, _, _) = send(&app, "DELETE", "/profile", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/validate", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, "GET", "/users/alice/animelist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_and_password() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;
    login_as(&app, "bob").await;

    let (status, body, _) = send(
        &app,
        "PUT",
        "/profile",
        Some(&cookie),
        Some(json!({"profile_picture": "https://img.example/me.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile_picture"], "https://img.example/me.png");
    assert_eq!(body["data"]["email"], "alice@example.com");

    let (status, _, _) = send(
        &app,
        "PUT",
        "/profile",
        Some(&cookie),
        Some(json!({"email": "bob@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _, _) = send(
        &app,
        "PUT",
        "/profile/password",
        Some(&cookie),
        Some(json!({"current_password": "wrong one", "new_password": "battery staple"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "PUT",
        "/profile/password",
        Some(&cookie),
        Some(json!({"current_password": "correct horse", "new_password": "battery staple"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "alice", "password": "battery staple"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_listings_carry_page_meta() {
    let app = spawn_app().await;

    let (status, body, _) = send(&app, "GET", "/anime/search?q=bebop&perPage=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["meta"],
        json!({"total": 45, "page": 1, "perPage": 2, "totalPages": 23, "hasNextPage": true})
    );

    let (_, body, _) = send(&app, "GET", "/anime/search?q=nothing", None, None).await;
    assert_eq!(
        body["meta"],
        json!({"total": 0, "page": 1, "perPage": 20, "totalPages": 0, "hasNextPage": false})
    );

    let (status, _, _) = send(&app, "GET", "/anime/search", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "GET", "/anime/popular?perPage=51", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body, _) = send(&app, "GET", "/anime/recommendations", None, None).await;
    assert_eq!(body["meta"]["perPage"], 10);
    assert_eq!(body["meta"]["total"], 100);

    let (status, body, _) = send(&app, "GET", "/anime/season/2024/fall", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalPages"], 1);

    let (status, _, _) = send(&app, "GET", "/anime/season/2024/autumn", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "GET", "/anime/season/next/fall", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send(&app, "GET", "/anime/trending", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to fetch trending anime")
    );
}

#[tokio::test]
async fn test_anime_details() {
    let app = spawn_app().await;

    let (status, body, _) = send(&app, "GET", &format!("/anime/{BEBOP}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["anime"]["id"], BEBOP);
    assert_eq!(body["data"]["providers"], json!([]));

    let (status, body, _) = send(&app, "GET", "/anime/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Anime not found");

    let (status, _, _) = send(&app, "GET", &format!("/anime/{BROKEN}"), None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _, _) = send(&app, "GET", "/anime/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "GET", "/anime/-4", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_watch_provider_crud() {
    let app = spawn_app().await;
    let cookie = login_as(&app, "alice").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/anime/provider",
        None,
        Some(json!({"anime_id": FRIEREN, "provider_name": "Crunchyroll", "provider_url": "https://cr.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body, _) = send(
        &app,
        "POST",
        "/anime/provider",
        Some(&cookie),
        Some(json!({
            "anime_id": FRIEREN,
            "provider_name": "Crunchyroll",
            "provider_url": "https://cr.example",
            "region": "us",
            "is_sub": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["region"], "US");
    assert_eq!(body["data"]["is_dub"], false);
    let provider_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body, _) = send(&app, "GET", &format!("/anime/{FRIEREN}"), None, None).await;
    assert_eq!(body["data"]["providers"].as_array().unwrap().len(), 1);

    let uri = format!("/providers/{provider_id}");
    let (status, body, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&cookie),
        Some(json!({"is_dub": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_dub"], true);
    assert_eq!(body["data"]["provider_name"], "Crunchyroll");

    let (status, _, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&cookie),
        Some(json!({"region": "USA"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "DELETE", "/providers/not-a-uuid", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, "DELETE", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send(&app, "DELETE", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Watch provider not found");
}

#[tokio::test]
async fn test_detail_fetch_reads_through_and_adds_reuse_cache() {
    let catalog = Arc::new(FakeCatalog::default());
    let app = spawn_app_with(catalog.clone()).await;
    let cookie = login_as(&app, "cacher").await;

    let (status, _, _) = send(&app, "GET", &format!("/anime/{BEBOP}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog.fetch_count(), 1);

    // Cached by the detail fetch: adding to the list and adding a provider stay local.
    let (status, _, _) = send(
        &app,
        "POST",
        "/animelist",
        Some(&cookie),
        Some(json!({"anime_id": BEBOP, "status": "WATCHING"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(
        &app,
        "POST",
        "/anime/provider",
        Some(&cookie),
        Some(json!({"anime_id": BEBOP, "provider_name": "Netflix", "provider_url": "https://nf.example"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog.fetch_count(), 1);

    // A detail fetch always goes upstream and refreshes the cached row.
    catalog.renamed.store(true, Ordering::SeqCst);
    let (status, body, _) = send(&app, "GET", &format!("/anime/{BEBOP}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["providers"].as_array().unwrap().len(), 1);
    assert_eq!(catalog.fetch_count(), 2);

    let (_, body, _) = send(&app, "GET", "/animelist", Some(&cookie), None).await;
    assert_eq!(
        body["data"][0]["anime"]["title"],
        "Cowboy Bebop EN (Remastered)"
    );
    assert_eq!(catalog.fetch_count(), 2);

    // An unseen id is fetched once, then served from the cache.
    for status in ["PLANNED", "WATCHING"] {
        let (code, _, _) = send(
            &app,
            "POST",
            "/animelist",
            Some(&cookie),
            Some(json!({"anime_id": FRIEREN, "status": status})),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
    }
    assert_eq!(catalog.fetch_count(), 3);
}

#[tokio::test]
async fn test_concurrent_duplicate_signups_conflict() {
    let app = spawn_app().await;
    let body = json!({"username": "twin", "email": "twin@example.com", "password": "correct horse"});

    let (first, second) = tokio::join!(
        send(&app, "POST", "/signup", None, Some(body.clone())),
        send(&app, "POST", "/signup", None, Some(body.clone())),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let loser = if first.0 == StatusCode::CONFLICT { first.1 } else { second.1 };
    assert_eq!(loser["success"], false);
    assert!(
        loser["error"] == "Username already taken" || loser["error"] == "Email already registered"
    );
}
