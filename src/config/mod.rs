//! Application configuration loaded from environment.

use std::net::SocketAddr;

use chrono::Duration;

/// Longest token or cookie lifetime accepted from configuration.
pub const MAX_LIFETIME_DAYS: i64 = 3650;

/// Connection settings for the user datastore.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL. When set, the individual parts are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    /// Connection URL for the pool: `DATABASE_URL` if given, otherwise built from the parts.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }
}

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:3000`).
    pub server_addr: SocketAddr,
    pub database: DatabaseConfig,
    /// Session token signing secret.
    pub jwt_secret: String,
    /// Lifetime of issued session tokens.
    pub jwt_expires_in: Duration,
    /// Lifetime of the session cookie, in days.
    pub jwt_cookie_expires_days: i64,
    /// Mark the session cookie `Secure` (frontend served over HTTPS).
    pub cookie_secure: bool,
    /// Answer register failures with 200 and an `error` body, as older clients expect.
    pub legacy_error_status: bool,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let server_addr = std::env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let server_addr: SocketAddr = server_addr
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            host: std::env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: match std::env::var("DATABASE_PORT") {
                Ok(v) => v
                    .parse()
                    .map_err(|_| ConfigLoadError::Invalid("DATABASE_PORT", v))?,
                Err(_) => 5432,
            },
            user: std::env::var("DATABASE_USER").unwrap_or_else(|_| "authd".to_string()),
            password: std::env::var("DATABASE_PASSWORD").unwrap_or_else(|_| "authd".to_string()),
            name: std::env::var("DATABASE").unwrap_or_else(|_| "authd".to_string()),
        };

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigLoadError::Missing("JWT_SECRET"))?;

        let jwt_expires_in = match std::env::var("JWT_EXPIRES_IN") {
            Ok(v) => parse_duration(&v).ok_or(ConfigLoadError::Invalid("JWT_EXPIRES_IN", v))?,
            Err(_) => Duration::days(90),
        };

        let jwt_cookie_expires_days = match std::env::var("JWT_COOKIE_EXPIRES") {
            Ok(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| (1..=MAX_LIFETIME_DAYS).contains(days))
                .ok_or(ConfigLoadError::Invalid("JWT_COOKIE_EXPIRES", v))?,
            Err(_) => 90,
        };

        let cookie_secure = env_flag("COOKIE_SECURE")?;
        let legacy_error_status = env_flag("LEGACY_ERROR_STATUS")?;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            server_addr,
            database,
            jwt_secret,
            jwt_expires_in,
            jwt_cookie_expires_days,
            cookie_secure,
            legacy_error_status,
            log_level,
        })
    }
}

fn env_flag(key: &'static str) -> Result<bool, ConfigLoadError> {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigLoadError::Invalid(key, v)),
        },
        Err(_) => Ok(false),
    }
}

/// Parse a token lifetime such as `90d`, `12h`, `30m`, `45s` or a bare number of seconds.
///
/// Lifetimes beyond [`MAX_LIFETIME_DAYS`] are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let amount: i64 = digits.parse().ok()?;
    if amount <= 0 {
        return None;
    }
    let duration = match unit.trim() {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        "w" => Duration::try_weeks(amount),
        _ => None,
    }?;
    (duration <= Duration::days(MAX_LIFETIME_DAYS)).then_some(duration)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Missing required variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
