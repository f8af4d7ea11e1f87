/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CORS 許可、JWT secret / ttl など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 起動時に一度だけ作り、以降は immutable な値として各 service に渡す
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;

/// HS256 key-size floor.
pub const MIN_SECRET_BYTES: usize = 32;
/// One year.
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Signing secret + token lifetime. Never rotated at runtime.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        if ttl <= Duration::zero() || ttl > Duration::seconds(MAX_TTL_SECONDS) {
            return Err(ConfigError::Invalid("JWT_TTL_SECONDS"));
        }

        Ok(Self { secret, ttl })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Optional ADMIN account created at startup.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout: StdDuration,
    pub request_body_limit_bytes: usize,

    pub auth: AuthConfig,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_source<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = get("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(StdDuration::from_secs)
            .unwrap_or(StdDuration::from_secs(30));

        let request_body_limit_bytes = get("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let ttl_seconds = get("JWT_TTL_SECONDS")
            .ok_or(ConfigError::Missing("JWT_TTL_SECONDS"))?
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::Invalid("JWT_TTL_SECONDS"))?;
        let ttl = Duration::try_seconds(ttl_seconds)
            .ok_or(ConfigError::Invalid("JWT_TTL_SECONDS"))?;
        let auth = AuthConfig::new(secret, ttl)?;

        let admin_seed = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.trim().is_empty() => {
                Some(AdminSeed { email, password })
            }
            _ => None,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            request_body_limit_bytes,
            auth,
            admin_seed,
        })
    }
}
