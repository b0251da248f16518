/*
 * Responsibility
 * - Load settings from the environment (.env supported via dotenvy)
 * - Validate eagerly: a missing/invalid required value fails startup
 * - Keep key material out of Debug output
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .trim()
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

#[derive(Debug, PartialEq, Eq)]
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

/// HS256 signing secret. `None` means "generate an ephemeral one at startup".
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Option<Vec<u8>>);

impl SigningSecret {
    pub fn configured(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("SigningSecret(<redacted>)"),
            None => f.write_str("SigningSecret(<ephemeral>)"),
        }
    }
}

/// Minimum HS256 key length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted access token lifetime (one year).
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub jwt_secret: SigningSecret,
    pub auth_issuer: String,
    pub access_token_ttl_seconds: u64,
    pub bcrypt_cost: u32,

    pub seed_demo_data: bool,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let database_url = var("DATABASE_URL");

        let database_max_connections =
            parse_or(var("DATABASE_MAX_CONNECTIONS"), 5, "DATABASE_MAX_CONNECTIONS")?;

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::Invalid("JWT_SECRET"));
            }
            Some(secret) => SigningSecret(Some(secret.into_bytes())),
            None if app_env.is_production() => return Err(ConfigError::Missing("JWT_SECRET")),
            None => SigningSecret(None),
        };

        let auth_issuer = var("AUTH_ISSUER").unwrap_or_else(|| "weather-api".to_string());

        let access_token_ttl_seconds: u64 = parse_or(
            var("ACCESS_TOKEN_TTL_SECONDS"),
            3600,
            "ACCESS_TOKEN_TTL_SECONDS",
        )?;
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&access_token_ttl_seconds) {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }

        let bcrypt_cost: u32 = parse_or(var("BCRYPT_COST"), 10, "BCRYPT_COST")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        let seed_demo_data = match var("SEED_DEMO_DATA") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("SEED_DEMO_DATA"))?,
            None => true,
        };

        let request_timeout_seconds =
            parse_or(var("REQUEST_TIMEOUT_SECONDS"), 30, "REQUEST_TIMEOUT_SECONDS")?;

        let request_body_limit_bytes = parse_or(
            var("REQUEST_BODY_LIMIT_BYTES"),
            1024 * 1024,
            "REQUEST_BODY_LIMIT_BYTES",
        )?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            jwt_secret,
            auth_issuer,
            access_token_ttl_seconds,
            bcrypt_cost,
            seed_demo_data,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    default: T,
    key: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
