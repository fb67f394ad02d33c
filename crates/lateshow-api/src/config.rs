use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use tracing::{info, warn};

/// Development-only signing secret. Never deploy with it.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Placeholder JWT secrets that MUST NOT be used in production.
const PLACEHOLDER_SECRETS: &[&str] = &[
    DEV_JWT_SECRET,
    "super-secret-key",
    "change-me-to-a-random-string",
];

const DEFAULT_DATABASE_URI: &str = "sqlite://lateshow.db";
const DEFAULT_TOKEN_TTL_SECS: i64 = 15 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

/// Process-wide settings, read once at startup and handed to the components.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database: DatabaseLocation,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => bail!("Unknown APP_ENV '{}'", other),
        };

        let database_uri =
            lookup("DATABASE_URI").unwrap_or_else(|| DEFAULT_DATABASE_URI.to_string());
        let database = parse_database_uri(&database_uri)?;

        let jwt_secret = match lookup("JWT_SECRET_KEY").filter(|s| !s.is_empty()) {
            Some(secret) if environment == Environment::Production
                && PLACEHOLDER_SECRETS.contains(&secret.as_str()) =>
            {
                bail!("JWT_SECRET_KEY is still a placeholder; set a random secret for production");
            }
            Some(secret) => secret,
            None if environment == Environment::Production => {
                bail!("JWT_SECRET_KEY must be set in production");
            }
            None => {
                warn!("JWT_SECRET_KEY not set, using the development default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let ttl_secs: i64 = match lookup("JWT_ACCESS_TOKEN_EXPIRES") {
            Some(v) => v
                .parse()
                .map_err(|e| anyhow!("Invalid JWT_ACCESS_TOKEN_EXPIRES '{}': {}", v, e))?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };
        if ttl_secs <= 0 {
            bail!("JWT_ACCESS_TOKEN_EXPIRES must be positive, got {}", ttl_secs);
        }

        let host = lookup("LATESHOW_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = match lookup("LATESHOW_PORT") {
            Some(v) => v.parse().map_err(|e| anyhow!("Invalid LATESHOW_PORT '{}': {}", v, e))?,
            None => 5555,
        };

        info!("Configuration loaded ({:?})", environment);
        Ok(Self {
            environment,
            database,
            jwt_secret,
            token_ttl: chrono::Duration::seconds(ttl_secs),
            host,
            port,
        })
    }
}

fn parse_database_uri(uri: &str) -> Result<DatabaseLocation> {
    let path = uri
        .strip_prefix("sqlite://")
        .or_else(|| uri.strip_prefix("sqlite:"))
        .unwrap_or(uri);

    if path == ":memory:" {
        return Ok(DatabaseLocation::Memory);
    }
    if path.is_empty() {
        bail!("DATABASE_URI has an empty path");
    }
    if path.contains("://") {
        bail!("Unsupported DATABASE_URI scheme in '{}'; only sqlite is supported", uri);
    }
    Ok(DatabaseLocation::File(PathBuf::from(path)))
}
