//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Runtime configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Story content file; the built-in story when absent.
    pub story_path: Option<PathBuf>,
    /// PostgreSQL URL; the in-memory event store when absent.
    pub database_url: Option<String>,
    /// Inactivity window after which a session expires.
    pub session_ttl: Duration,
    /// Upper bound on one perception-generation call.
    pub generation_timeout: Duration,
    /// Per-character pacing of the terminal rendering.
    pub typing_delay: Duration,
    /// How often expired sessions are evicted.
    pub reaper_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5003,
            story_path: None,
            database_url: None,
            session_ttl: Duration::from_secs(1800),
            generation_timeout: Duration::from_millis(10_000),
            typing_delay: Duration::from_millis(50),
            reaper_interval: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or empty variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an unparsable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: parse(&get, "PORT")?.unwrap_or(defaults.port),
            story_path: get("STORY_PATH").map(PathBuf::from),
            database_url: get("DATABASE_URL"),
            session_ttl: parse(&get, "SESSION_TTL_SECS")?
                .map_or(defaults.session_ttl, Duration::from_secs),
            generation_timeout: parse(&get, "GENERATION_TIMEOUT_MS")?
                .map_or(defaults.generation_timeout, Duration::from_millis),
            typing_delay: parse(&get, "TYPING_DELAY_MS")?
                .map_or(defaults.typing_delay, Duration::from_millis),
            reaper_interval: parse(&get, "REAPER_INTERVAL_SECS")?
                .map_or(defaults.reaper_interval, Duration::from_secs),
        };
        if config.reaper_interval.is_zero() {
            return Err(AppError::Config(
                "REAPER_INTERVAL_SECS must be greater than zero".into(),
            ));
        }
        Ok(config)
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}")))
        })
        .transpose()
}
