//! Inbound response classification and error mapping.
//!
//! # Invariants
//! - `401` is surfaced as `Unauthorized`; stored credentials stay intact.
//! - `511` clears primary and refresh credentials before surfacing.
//! - `409` and `415` map to dedicated variants; other error statuses
//!   propagate unmodified as `Status`.

use crate::auth::store::CredentialStore;
use log::{error, warn};
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_UNSUPPORTED_MEDIA_TYPE: u16 = 415;
pub const STATUS_NETWORK_AUTHENTICATION_REQUIRED: u16 = 511;

pub type ApiResult<T> = Result<T, ApiError>;

/// Raw transport response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Backend-provided `message`, when present.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// Backend response envelope: `{ success, message, data }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Failure reaching the backend at all (no HTTP status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport failure: {}", self.message)
    }
}

impl Error for TransportError {}

#[derive(Debug)]
pub enum ApiError {
    /// `401`: credential left in place.
    Unauthorized { message: String },
    /// `511`: both credentials were cleared.
    NetworkAuthenticationRequired { message: String },
    Conflict { message: String },
    UnsupportedMediaType { message: String },
    /// Any other non-2xx status, unmodified.
    Status { status: u16, message: String },
    /// 2xx with `success: false`.
    Rejected { message: String },
    Transport(TransportError),
    Decode(serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(STATUS_UNAUTHORIZED),
            Self::NetworkAuthenticationRequired { .. } => {
                Some(STATUS_NETWORK_AUTHENTICATION_REQUIRED)
            }
            Self::Conflict { .. } => Some(STATUS_CONFLICT),
            Self::UnsupportedMediaType { .. } => Some(STATUS_UNSUPPORTED_MEDIA_TYPE),
            Self::Status { status, .. } => Some(*status),
            Self::Rejected { .. } | Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { message } => write!(f, "unauthorized: {message}"),
            Self::NetworkAuthenticationRequired { message } => {
                write!(f, "network authentication required: {message}")
            }
            Self::Conflict { message } => write!(f, "conflict: {message}"),
            Self::UnsupportedMediaType { message } => {
                write!(f, "unsupported media type: {message}")
            }
            Self::Status { status, message } => write!(f, "request failed ({status}): {message}"),
            Self::Rejected { message } => write!(f, "request rejected: {message}"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "failed to decode response: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Maps a non-2xx response to `ApiError`, applying the credential side effects.
pub fn map_error_response<S: CredentialStore>(response: &ApiResponse, store: &S) -> ApiError {
    let message = response
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", response.status));

    match response.status {
        STATUS_UNAUTHORIZED => {
            warn!("event=api_error module=api status=unauthorized http_status=401");
            ApiError::Unauthorized { message }
        }
        STATUS_NETWORK_AUTHENTICATION_REQUIRED => {
            warn!("event=api_error module=api status=network_auth_required http_status=511 action=clear_credentials");
            if let Err(err) = store.clear() {
                error!(
                    "event=credential_clear module=api status=error error_code=store_clear_failed error={err}"
                );
            }
            ApiError::NetworkAuthenticationRequired { message }
        }
        STATUS_CONFLICT => {
            warn!("event=api_error module=api status=conflict http_status=409");
            ApiError::Conflict { message }
        }
        STATUS_UNSUPPORTED_MEDIA_TYPE => {
            warn!("event=api_error module=api status=unsupported_media_type http_status=415");
            ApiError::UnsupportedMediaType { message }
        }
        status => ApiError::Status { status, message },
    }
}
