use std::env;

use axum::http::{header, HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::timezone::DisplayTimezone;

const DEFAULT_DATABASE_URL: &str = "sqlite://eventdesk.db";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("DISPLAY_UTC_OFFSET must look like +05:30, got {0:?}")]
    InvalidOffset(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub display_timezone: DisplayTimezone,
    pub api_prefix: String,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            display_timezone: DisplayTimezone::default(),
            api_prefix: String::new(),
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let display_timezone = match lookup("DISPLAY_UTC_OFFSET") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidOffset(raw))?,
            None => defaults.display_timezone,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            port,
            display_timezone,
            api_prefix: lookup("API_PREFIX")
                .map(|p| normalize_prefix(&p))
                .unwrap_or(defaults.api_prefix),
            allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
        })
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("CORS: invalid origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();

        let allow_origin = if origins.is_empty() {
            tracing::warn!("CORS: no valid origins configured, allowing any origin");
            AllowOrigin::any()
        } else {
            tracing::info!("CORS: {} allowed origin(s)", origins.len());
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

// "api/" and "/api" both become "/api"; "/" and "" mean no prefix.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
