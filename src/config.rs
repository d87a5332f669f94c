/*
 * Responsibility
 * - Environment configuration (DATABASE_URL, identity provider, CORS, ...)
 * - Validation at startup: a missing required key fails the process,
 *   never a request
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub database_url: String,
    pub cors_allowed_origins: Vec<String>,

    // Identity provider (GoTrue-style). Base URL and public key are
    // startup-required; the service-role key unlocks the admin surface.
    pub identity_base_url: Url,
    pub identity_public_key: String,
    pub identity_service_role_key: String,

    /// Upper bound on any single identity-provider round-trip. A slow
    /// provider fails the gate instead of hanging the request.
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let identity_base_url = std::env::var("IDENTITY_BASE_URL")
            .map_err(|_| ConfigError::Missing("IDENTITY_BASE_URL"))?;
        let identity_base_url =
            Url::parse(&identity_base_url).map_err(|_| ConfigError::Invalid("IDENTITY_BASE_URL"))?;

        let identity_public_key = std::env::var("IDENTITY_PUBLIC_KEY")
            .map_err(|_| ConfigError::Missing("IDENTITY_PUBLIC_KEY"))?;

        let identity_service_role_key = std::env::var("IDENTITY_SERVICE_ROLE_KEY")
            .map_err(|_| ConfigError::Missing("IDENTITY_SERVICE_ROLE_KEY"))?;

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let upstream_timeout = std::env::var("UPSTREAM_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            identity_base_url,
            identity_public_key,
            identity_service_role_key,
            upstream_timeout,
        })
    }
}
