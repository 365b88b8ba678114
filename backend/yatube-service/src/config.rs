/// Configuration management for Yatube Service
///
/// Loads configuration from environment variables. A missing `DATABASE_URL`
/// or `REDIS_URL` selects the in-memory content store or feed cache.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Feed pagination and caching
    pub feed: FeedConfig,
    /// Bearer token settings
    pub auth: AuthConfig,
    /// Operational endpoints
    pub admin: AdminConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; `None` runs on the in-memory store
    pub url: Option<String>,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; `None` keeps the feed cache in process
    pub url: Option<String>,
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts per page, shared by every feed (AMOUNT_POSTS)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Lifetime of the cached global feed
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Key prefix of the cached global feed
    #[serde(default = "default_cache_key_prefix")]
    pub cache_key_prefix: String,
    /// Whether the global feed is cached at all
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_key_prefix: default_cache_key_prefix(),
            cache_enabled: default_cache_enabled(),
        }
    }
}

/// Bearer token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    /// Where unauthenticated viewers are sent
    #[serde(default = "default_login_url")]
    pub login_url: String,
}

/// Operational endpoints configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared token required in `X-Admin-Token`; `None` leaves /internal open
    pub token: Option<String>,
}

// Default values
fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_page_size() -> usize {
    10
}

fn default_cache_ttl_secs() -> u64 {
    20
}

fn default_cache_key_prefix() -> String {
    "index_page".to_string()
}

fn default_cache_enabled() -> bool {
    true
}

fn default_token_ttl_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_login_url() -> String {
    "/auth/login/".to_string()
}

const DEV_JWT_SECRET: &str = "yatube-dev-secret";

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_or("PORT", 8000).context("invalid PORT")?,
        };

        let database = DatabaseConfig {
            url: non_empty_env("DATABASE_URL"),
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", default_max_connections())?,
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", default_min_connections())?,
        };

        let cache = CacheConfig {
            url: non_empty_env("REDIS_URL"),
        };

        let feed = FeedConfig {
            page_size: parse_env_or("AMOUNT_POSTS", default_page_size())?,
            cache_ttl_secs: parse_env_or("FEED_CACHE_TTL_SECS", default_cache_ttl_secs())?,
            cache_key_prefix: non_empty_env("FEED_CACHE_KEY_PREFIX")
                .unwrap_or_else(default_cache_key_prefix),
            cache_enabled: parse_env_or("FEED_CACHE_ENABLED", default_cache_enabled())?,
        };
        if feed.page_size == 0 {
            bail!("AMOUNT_POSTS must be greater than zero");
        }

        let jwt_secret = match non_empty_env("JWT_SECRET") {
            Some(secret) => secret,
            None if app.is_production() => bail!("JWT_SECRET must be set in production"),
            None => DEV_JWT_SECRET.to_string(),
        };
        let auth = AuthConfig {
            jwt_secret,
            token_ttl_secs: parse_env_or("JWT_TOKEN_TTL_SECS", default_token_ttl_secs())?,
            login_url: non_empty_env("LOGIN_URL").unwrap_or_else(default_login_url),
        };

        let admin = AdminConfig {
            token: non_empty_env("ADMIN_TOKEN"),
        };
        if app.is_production() && admin.token.is_none() {
            bail!("ADMIN_TOKEN must be set in production");
        }

        Ok(Config {
            app,
            database,
            cache,
            feed,
            auth,
            admin,
        })
    }
}
