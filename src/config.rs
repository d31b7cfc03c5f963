use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Secret shipped in the default config. Fine for local development only.
pub const DEV_JWT_SECRET: &str = "wawatch-dev-secret-change-me";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub catalog: CatalogConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/wawatch.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on the session cookie.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify session tokens (HS256).
    pub jwt_secret: String,

    /// Name of the cookie carrying the session token.
    pub cookie_name: String,

    pub token_ttl_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            cookie_name: "Auth".to_string(),
            token_ttl_hours: 24 * 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_password_length: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_url: String,

    /// Client-side timeout for every catalog request (default: 10)
    pub request_timeout_seconds: u64,

    pub default_per_page: u32,

    /// AniList refuses pages larger than 50.
    pub max_per_page: u32,

    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: "https://graphql.anilist.co".to_string(),
            request_timeout_seconds: 10,
            default_per_page: 20,
            max_per_page: 50,
            user_agent: concat!("wawatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    /// Reads `WAWATCH_CONFIG` if set, otherwise the first existing file among
    /// the standard locations, then applies `WAWATCH_*` overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate() {
            Some(path) => {
                info!(path = %path.display(), "Loading config");
                Self::load_from_path(&path)?
            }
            None => {
                info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn locate() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os("WAWATCH_CONFIG") {
            return Some(PathBuf::from(explicit));
        }

        let local = PathBuf::from(CONFIG_FILE);
        let per_user = dirs::config_dir().map(|dir| dir.join("wawatch").join(CONFIG_FILE));
        let dotdir = dirs::home_dir().map(|home| home.join(".wawatch").join(CONFIG_FILE));

        std::iter::once(local)
            .chain(per_user)
            .chain(dotdir)
            .find(|candidate| candidate.is_file())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("WAWATCH_DATABASE_URL") {
            self.general.database_url = url;
        }

        if let Ok(secret) = std::env::var("WAWATCH_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(port) = std::env::var("WAWATCH_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid WAWATCH_PORT: {port}"))?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        let rendered = toml::to_string_pretty(self).context("Cannot serialize config")?;
        std::fs::write(path, rendered).with_context(|| format!("Cannot write {}", path.display()))
    }

    /// Writes the defaults to `./config.toml`. Returns false if the file already exists.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to_path(path)?;
        info!(path = %path.display(), "Wrote default config");
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            anyhow::bail!("auth.jwt_secret cannot be empty");
        }

        if self.auth.jwt_secret == DEV_JWT_SECRET {
            warn!("auth.jwt_secret is the built-in development secret; set WAWATCH_JWT_SECRET");
        }

        if self.auth.cookie_name.is_empty() {
            anyhow::bail!("auth.cookie_name cannot be empty");
        }

        if self.catalog.request_timeout_seconds == 0 {
            anyhow::bail!("catalog.request_timeout_seconds must be > 0");
        }

        if self.catalog.default_per_page == 0
            || self.catalog.default_per_page > self.catalog.max_per_page
        {
            anyhow::bail!(
                "catalog.default_per_page must be between 1 and {}",
                self.catalog.max_per_page
            );
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!("general.min_db_connections cannot exceed max_db_connections");
        }

        Ok(())
    }
}
