//! Client configuration.
//!
//! # Responsibility
//! - Hold API base URL, credential TTL, the bearer-header allow-list and
//!   redirect targets used by routing.
//! - Load from JSON documents; missing fields fall back to defaults.
//!
//! # Invariants
//! - `credential_ttl_secs` is never zero after loading.
//! - `excluded_auth_paths` entries are non-empty, trimmed strings.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Default lifetime of stored credentials (one day).
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const DEFAULT_FALLBACK_PATH: &str = "/";

/// Endpoints that must never receive the `Authorization` header.
pub const DEFAULT_EXCLUDED_AUTH_PATHS: &[&str] = &[
    "/auth/login",
    "/signup",
    "/forgot-password",
    "/send-otp",
    "/verify-otp",
];

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read client config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse client config: {err}"),
            Self::Invalid(details) => write!(f, "invalid client config: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Front-end client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_base_url: String,
    pub credential_ttl_secs: u64,
    pub excluded_auth_paths: Vec<String>,
    pub unauthorized_path: String,
    pub fallback_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            credential_ttl_secs: DEFAULT_CREDENTIAL_TTL.as_secs(),
            excluded_auth_paths: DEFAULT_EXCLUDED_AUTH_PATHS
                .iter()
                .map(|value| value.to_string())
                .collect(),
            unauthorized_path: DEFAULT_UNAUTHORIZED_PATH.to_string(),
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parses config from a JSON document and validates it.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw)?;
        config.normalize()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(raw.as_str())
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl_secs)
    }

    /// Returns `true` when `path` must be sent without a bearer header.
    pub fn is_auth_excluded(&self, path: &str) -> bool {
        self.excluded_auth_paths
            .iter()
            .any(|excluded| path.contains(excluded.as_str()))
    }

    /// Joins the base URL and an API path.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        if self.credential_ttl_secs == 0 {
            return Err(ConfigError::Invalid("credentialTtlSecs must be positive"));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("apiBaseUrl must not be empty"));
        }
        self.excluded_auth_paths = self
            .excluded_auth_paths
            .iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        Ok(())
    }
}
