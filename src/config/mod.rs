use crate::util::env::{
    get_bool_from_env_or, get_duration_from_env_or, get_env_or, get_size_from_env_or,
    get_vec_from_env_or, load_dotenv,
};
use crate::util::retry::RetryPolicy;
use anyhow::{bail, Result};
use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::warn;

pub mod db;
pub mod rd;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub app_version: String,

    pub http: HTTPConfig,
    pub upload: UploadConfig,
    pub db: DBConfig,
    pub redis: RedisConfig,
    pub log: LogConfig,
    pub auth: AuthConfig,
    pub badge: BadgeConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct HTTPConfig {
    pub ip: String,
    pub port: u16,
    pub max_body_size: u64,
    pub cors: CORSConfig,
}

#[derive(Debug, Clone)]
pub struct CORSConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: u64,
}

/// Object storage for user images. Objects are written below `base_path`
/// and served from `base_url`.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub base_path: String,
    pub base_url: String,
    pub max_image_size: u64,
    pub image_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DBConfig {
    pub url: String,
    pub pool_size: u32,
    pub auto_migrate: bool,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_requests: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Cookie holding the session token written by the OAuth adapter.
    pub session_cookie: String,
}

#[derive(Debug, Clone)]
pub struct BadgeConfig {
    /// Exposes `/api/badges/calculate`. Off in release builds unless set.
    pub manual_calculation: bool,
    pub scheduler_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_secs: u64,
    pub max_requests: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        Ok(AppConfig {
            app_name: get_env_or("APP_NAME", "Letterbox".to_string())?,
            app_version: get_env_or("APP_VERSION", env!("CARGO_PKG_VERSION").to_string())?,

            http: HTTPConfig::from_env()?,
            upload: UploadConfig::from_env()?,
            db: DBConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            log: LogConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            badge: BadgeConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.db.pool_size == 0 {
            bail!("DATABASE_POOL_SIZE must be greater than 0");
        }
        if self.db.retry.max_attempts == 0 {
            bail!("DATABASE_RETRY_ATTEMPTS must be greater than 0");
        }
        if self.upload.max_image_size == 0 || self.upload.max_image_size > self.http.max_body_size {
            bail!("UPLOAD_MAX_IMAGE_SIZE must be between 1 and HTTP_MAX_BODY_SIZE");
        }
        if self.upload.image_types.is_empty() {
            bail!("UPLOAD_IMAGE_TYPES cannot be empty");
        }
        if !self.upload.base_url.starts_with('/') && !self.upload.base_url.starts_with("http") {
            bail!("UPLOAD_URL must be an absolute path or an http(s) URL");
        }
        let cors = &self.http.cors;
        if cors.allow_credentials && cors.allowed_origins.iter().any(|o| o == "*") {
            bail!("CORS_ALLOW_CREDENTIALS cannot be combined with a wildcard origin");
        }
        if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
            bail!("RATE_LIMIT_MAX_REQUESTS must be greater than 0");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            app_name: "Letterbox".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            http: HTTPConfig::default(),
            upload: UploadConfig::default(),
            db: DBConfig::default(),
            redis: RedisConfig::default(),
            log: LogConfig::default(),
            auth: AuthConfig::default(),
            badge: BadgeConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl HTTPConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(HTTPConfig {
            ip: get_env_or("HTTP_IP", d.ip)?,
            port: get_env_or("HTTP_PORT", d.port)?,
            max_body_size: get_size_from_env_or("HTTP_MAX_BODY_SIZE", d.max_body_size)?,
            cors: CORSConfig::from_env()?,
        })
    }
}

impl Default for HTTPConfig {
    fn default() -> Self {
        HTTPConfig {
            ip: "127.0.0.1".to_string(),
            port: 8000,
            max_body_size: 10 * 1024 * 1024,
            cors: CORSConfig::default(),
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(UploadConfig {
            base_path: get_env_or("UPLOAD_PATH", d.base_path)?,
            base_url: get_env_or("UPLOAD_URL", d.base_url)?,
            max_image_size: get_size_from_env_or("UPLOAD_MAX_IMAGE_SIZE", d.max_image_size)?,
            image_types: get_vec_from_env_or("UPLOAD_IMAGE_TYPES", d.image_types)?,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            base_path: "./uploads".to_string(),
            base_url: "/uploads".to_string(),
            max_image_size: 2 * 1024 * 1024,
            image_types: ["image/jpeg", "image/png", "image/webp", "image/gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DBConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(DBConfig {
            url: get_env_or("DATABASE_URL", d.url)?,
            pool_size: get_env_or("DATABASE_POOL_SIZE", d.pool_size)?,
            auto_migrate: get_bool_from_env_or("DATABASE_AUTO_MIGRATE", d.auto_migrate)?,
            retry: RetryPolicy {
                max_attempts: get_env_or("DATABASE_RETRY_ATTEMPTS", d.retry.max_attempts)?,
                base_delay: get_duration_from_env_or("DATABASE_RETRY_BASE_DELAY", d.retry.base_delay)?,
                max_delay: get_duration_from_env_or("DATABASE_RETRY_MAX_DELAY", d.retry.max_delay)?,
            },
        })
    }
}

impl Default for DBConfig {
    fn default() -> Self {
        DBConfig {
            url: "sqlite://letterbox.db?mode=rwc".to_string(),
            pool_size: 5,
            auto_migrate: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl RedisConfig {
    pub fn from_env() -> Result<Self> {
        Ok(RedisConfig {
            url: get_env_or("REDIS_URL", Self::default().url)?,
        })
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        RedisConfig {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Result<Self> {
        Ok(LogConfig {
            log_requests: get_bool_from_env_or("LOG_REQUESTS", false)?,
        })
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { log_requests: false }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self> {
        Ok(AuthConfig {
            session_cookie: get_env_or("AUTH_SESSION_COOKIE", Self::default().session_cookie)?,
        })
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            session_cookie: "session_token".to_string(),
        }
    }
}

impl BadgeConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(BadgeConfig {
            manual_calculation: get_bool_from_env_or("BADGE_MANUAL_CALCULATION", d.manual_calculation)?,
            scheduler_enabled: get_bool_from_env_or("BADGE_SCHEDULER_ENABLED", d.scheduler_enabled)?,
        })
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        BadgeConfig {
            manual_calculation: cfg!(debug_assertions),
            scheduler_enabled: false,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(RateLimitConfig {
            enabled: get_bool_from_env_or("RATE_LIMIT_ENABLED", d.enabled)?,
            window_secs: get_env_or("RATE_LIMIT_WINDOW_SECS", d.window_secs)?,
            max_requests: get_env_or("RATE_LIMIT_MAX_REQUESTS", d.max_requests)?,
        })
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            enabled: true,
            window_secs: 60,
            max_requests: 120,
        }
    }
}

impl CORSConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        Ok(CORSConfig {
            allowed_origins: get_vec_from_env_or("CORS_ALLOWED_ORIGINS", d.allowed_origins)?,
            allowed_methods: get_vec_from_env_or("CORS_ALLOWED_METHODS", d.allowed_methods)?,
            allowed_headers: get_vec_from_env_or("CORS_ALLOWED_HEADERS", d.allowed_headers)?,
            allow_credentials: get_bool_from_env_or("CORS_ALLOW_CREDENTIALS", d.allow_credentials)?,
            max_age: get_env_or("CORS_MAX_AGE", d.max_age)?,
        })
    }

    pub fn into_layer(self) -> CorsLayer {
        let wildcard = |list: &[String]| list.iter().any(|v| v == "*");

        let mut cors = CorsLayer::new();

        cors = if wildcard(&self.allowed_origins) {
            cors.allow_origin(Any)
        } else {
            cors.allow_origin(AllowOrigin::list(parse_all::<HeaderValue>(&self.allowed_origins)))
        };

        cors = if wildcard(&self.allowed_methods) {
            cors.allow_methods(Any)
        } else {
            cors.allow_methods(AllowMethods::list(parse_all::<Method>(&self.allowed_methods)))
        };

        cors = if wildcard(&self.allowed_headers) {
            cors.allow_headers(Any)
        } else {
            cors.allow_headers(AllowHeaders::list(parse_all::<HeaderName>(&self.allowed_headers)))
        };

        cors.allow_credentials(self.allow_credentials)
            .max_age(Duration::from_secs(self.max_age))
    }
}

impl Default for CORSConfig {
    fn default() -> Self {
        CORSConfig {
            allowed_origins: vec![],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            allow_credentials: false,
            max_age: 86400,
        }
    }
}

// Drops entries that are not valid header values, methods or names
fn parse_all<T: std::str::FromStr>(values: &[String]) -> Vec<T> {
    values
        .iter()
        .filter_map(|v| match v.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("Ignoring invalid CORS entry: {}", v);
                None
            }
        })
        .collect()
}
