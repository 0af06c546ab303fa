//! Configuration module for environment variable parsing.
//!
//! Credentials are required in production. Elsewhere, missing credentials are
//! replaced with placeholders so the server can run locally and in tests.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::line::DEFAULT_API_BASE;
use crate::template::DEFAULT_TEMPLATE_PATH;

pub const PLACEHOLDER_SECRET: &str = "DUMMY_SECRET";
pub const PLACEHOLDER_TOKEN: &str = "DUMMY_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set when APP_ENV=production")]
    Missing(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE channel secret, the HMAC key for webhook signatures
    pub channel_secret: String,

    /// LINE channel access token for the reply API
    pub channel_access_token: String,

    /// True when APP_ENV=production
    pub production: bool,

    /// Port for the web server to listen on
    pub port: u16,

    /// LINE API base URL
    pub api_base: String,

    /// Location of the flex message template
    pub template_path: PathBuf,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let production = lookup("APP_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let channel_secret = credential(
            non_empty("LINE_CHANNEL_SECRET"),
            "LINE_CHANNEL_SECRET",
            PLACEHOLDER_SECRET,
            production,
        )?;

        let channel_access_token = credential(
            non_empty("LINE_CHANNEL_ACCESS_TOKEN"),
            "LINE_CHANNEL_ACCESS_TOKEN",
            PLACEHOLDER_TOKEN,
            production,
        )?;

        Ok(Config {
            channel_secret,
            channel_access_token,
            production,

            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            api_base: non_empty("LINE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),

            template_path: non_empty("FLEX_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_PATH)),

            request_timeout_ms: non_empty("REQUEST_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }

    /// True if either credential is a placeholder.
    pub fn uses_placeholders(&self) -> bool {
        self.channel_secret == PLACEHOLDER_SECRET || self.channel_access_token == PLACEHOLDER_TOKEN
    }
}

fn credential(
    value: Option<String>,
    name: &'static str,
    placeholder: &str,
    production: bool,
) -> Result<String, ConfigError> {
    match value {
        Some(v) => Ok(v),
        None if production => Err(ConfigError::Missing(name)),
        None => {
            warn!(env_var = name, "credential_missing_using_placeholder");
            Ok(placeholder.to_string())
        }
    }
}
