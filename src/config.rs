//! Configuration module
//!
//! Settings come from the environment (optionally seeded from a `.env` file).
//! Every value has a default suitable for local development.

use std::str::FromStr;

use crate::application::live::DEFAULT_OUTBOX_CAPACITY;
use crate::infrastructure::database::{DatabaseConfig, DEFAULT_DATABASE_NAME, DEFAULT_DATABASE_URL};

/// Origins allowed when `CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds allowed for graceful teardown
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// Allowed cross-origin hosts; `*` allows any origin
    pub cors_origins: Vec<String>,
    /// Per-subscriber outbox capacity
    pub subscriber_buffer: usize,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            subscriber_buffer: DEFAULT_OUTBOX_CAPACITY,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    ///
    /// Returns the config together with a notice for every value that fell
    /// back to its default; logging is not set up yet at this point, so the
    /// caller reports them once tracing is installed.
    pub fn from_env() -> (Self, Vec<String>) {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut notices = Vec::new();

        let server = ServerConfig {
            host: get("API_HOST").unwrap_or(defaults.server.host),
            port: parse_or(get("API_PORT"), "API_PORT", defaults.server.port, &mut notices),
            shutdown_timeout: parse_or(
                get("SHUTDOWN_TIMEOUT"),
                "SHUTDOWN_TIMEOUT",
                defaults.server.shutdown_timeout,
                &mut notices,
            ),
        };

        let database = DatabaseConfig::new(
            get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            get("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        );

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or(defaults.cors_origins);

        let format = match get("LOG_FORMAT").map(|f| f.trim().to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(f) => {
                notices.push(format!("Invalid value for LOG_FORMAT: {:?}, using text", f));
                LogFormat::Text
            }
        };

        let subscriber_buffer = parse_or(
            get("SUBSCRIBER_BUFFER"),
            "SUBSCRIBER_BUFFER",
            defaults.subscriber_buffer,
            &mut notices,
        );
        if subscriber_buffer == 0 {
            notices.push("SUBSCRIBER_BUFFER must be at least 1, using 1".to_string());
        }

        let config = Self {
            server,
            database,
            cors_origins,
            subscriber_buffer: subscriber_buffer.max(1),
            logging: LoggingConfig {
                level: get("LOG_LEVEL").unwrap_or(defaults.logging.level),
                format,
            },
        };
        (config, notices)
    }
}

/// `*` anywhere in the origin list allows every origin.
pub fn allows_any_origin(origins: &[String]) -> bool {
    origins.iter().any(|o| o == "*")
}

/// Split a comma-separated origin list, trimming and dropping empties.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn parse_or<T>(value: Option<String>, key: &str, default: T, notices: &mut Vec<String>) -> T
where
    T: FromStr + std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            notices.push(format!(
                "Invalid value for {}: {:?}, using default {}",
                key, raw, default
            ));
            default
        }),
        None => default,
    }
}
