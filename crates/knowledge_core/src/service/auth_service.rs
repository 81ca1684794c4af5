//! Login, signup and logout use-cases.
//!
//! # Responsibility
//! - Exchange credentials with the backend auth endpoints.
//! - Write issued credentials to the store with the configured TTL.
//!
//! # Invariants
//! - Credentials are stored only for successful login envelopes, as one
//!   (primary, refresh) pair.
//! - Logout clears primary and refresh credentials together.

use crate::api::client::{ApiClient, HttpTransport};
use crate::api::request::ApiRequest;
use crate::api::response::{ApiEnvelope, ApiError};
use crate::auth::credential::Credential;
use crate::auth::store::{CredentialStore, StoreError};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AuthServiceError {
    Api(ApiError),
    Store(StoreError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ApiError> for AuthServiceError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<StoreError> for AuthServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for AuthServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Api(ApiError::Decode(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// `data` payload of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub jwt_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_jwt_token: Option<String>,
}

impl LoginData {
    /// Issued bearer credential; `token` wins over `jwtToken`.
    pub fn issued_token(&self) -> Option<&str> {
        first_non_blank(self.token.as_deref(), self.jwt_token.as_deref())
    }

    pub fn issued_refresh_token(&self) -> Option<&str> {
        first_non_blank(
            self.refresh_token.as_deref(),
            self.refresh_jwt_token.as_deref(),
        )
    }
}

fn first_non_blank<'a>(primary: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    primary
        .filter(|value| !value.trim().is_empty())
        .or_else(|| fallback.filter(|value| !value.trim().is_empty()))
}

pub struct AuthService<'a, T: HttpTransport, S: CredentialStore> {
    client: &'a ApiClient<T, S>,
}

impl<'a, T: HttpTransport, S: CredentialStore> AuthService<'a, T, S> {
    pub fn new(client: &'a ApiClient<T, S>) -> Self {
        Self { client }
    }

    /// Logs in and stores the issued credentials.
    ///
    /// # Errors
    /// - `Api(Rejected)` when the backend answers `success: false`.
    pub async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<ApiEnvelope<LoginData>, AuthServiceError> {
        let api_request = ApiRequest::post("/auth/login").with_json(request)?;
        let envelope = self.client.send_envelope::<LoginData>(api_request).await?;

        let ttl = self.client.config().credential_ttl();
        let store = self.client.store();
        let data = envelope.data.clone().unwrap_or_default();
        if let Some(token) = data.issued_token() {
            store.replace_pair(
                Credential::new(token),
                data.issued_refresh_token().map(Credential::new),
                ttl,
            )?;
            info!(
                "event=login module=auth status=ok stored=true ttl_secs={}",
                ttl.as_secs()
            );
        } else {
            info!("event=login module=auth status=ok stored=false reason=no_token");
        }
        Ok(envelope)
    }

    pub async fn signup(
        &self,
        request: &SignupRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>, AuthServiceError> {
        let api_request = ApiRequest::post("/auth/signup").with_json(request)?;
        Ok(self.client.send_envelope(api_request).await?)
    }

    pub fn logout(&self) -> Result<(), AuthServiceError> {
        self.client.store().clear()?;
        info!("event=logout module=auth status=ok");
        Ok(())
    }
}
