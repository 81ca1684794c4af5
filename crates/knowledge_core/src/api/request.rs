//! Outbound API requests and bearer decoration.
//!
//! # Invariants
//! - Paths matching the configured allow-list never carry `Authorization`,
//!   even when a caller set one explicitly.
//! - Other requests carry `Authorization: Bearer <credential>` when a
//!   credential is stored; without one they are sent undecorated.

use crate::auth::store::CredentialStore;
use crate::config::ClientConfig;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(value)
    }
}

/// Transport-neutral API request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Serializes `body` as the JSON request payload.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Attaches or strips the bearer header according to `config`.
pub fn decorate<S: CredentialStore>(
    mut request: ApiRequest,
    config: &ClientConfig,
    store: &S,
) -> ApiRequest {
    if config.is_auth_excluded(request.path.as_str()) {
        request.headers.remove(AUTHORIZATION_HEADER);
        debug!(
            "event=request_decorate module=api status=skipped reason=excluded_path method={} path={}",
            request.method, request.path
        );
        return request;
    }

    match store.get() {
        Ok(Some(credential)) if !credential.is_empty() => {
            request.headers.insert(
                AUTHORIZATION_HEADER.to_string(),
                credential.bearer_header_value(),
            );
        }
        Ok(_) => {
            debug!(
                "event=request_decorate module=api status=skipped reason=no_credential method={} path={}",
                request.method, request.path
            );
        }
        Err(err) => {
            warn!(
                "event=request_decorate module=api status=error error_code=store_read_failed error={err}"
            );
        }
    }
    request
}

#[cfg(test)]
mod tests {
    use super::{decorate, ApiRequest, AUTHORIZATION_HEADER};
    use crate::auth::credential::Credential;
    use crate::auth::store::{CredentialStore, MemoryCredentialStore};
    use crate::clock::ManualClock;
    use crate::config::ClientConfig;
    use std::time::Duration;

    fn store_with_token() -> MemoryCredentialStore<ManualClock> {
        let store = MemoryCredentialStore::new(ManualClock::at_secs(0));
        store
            .set(Credential::new("h.p.s"), Duration::from_secs(60))
            .expect("set");
        store
    }

    #[test]
    fn attaches_bearer_to_regular_paths() {
        let store = store_with_token();
        let request = decorate(ApiRequest::get("/articles/my"), &ClientConfig::default(), &store);
        assert_eq!(request.header(AUTHORIZATION_HEADER), Some("Bearer h.p.s"));
    }

    #[test]
    fn excluded_paths_never_carry_the_header() {
        let store = store_with_token();
        let config = ClientConfig::default();
        for path in [
            "/auth/login",
            "/auth/signup",
            "/auth/forgot-password",
            "/auth/send-otp",
            "/auth/verify-otp",
        ] {
            let mut request = ApiRequest::post(path);
            request
                .headers
                .insert(AUTHORIZATION_HEADER.to_string(), "Bearer stale".to_string());
            let decorated = decorate(request, &config, &store);
            assert_eq!(decorated.header(AUTHORIZATION_HEADER), None, "{path}");
        }
    }

    #[test]
    fn no_credential_means_no_header() {
        let store = MemoryCredentialStore::new(ManualClock::at_secs(0));
        let request = decorate(ApiRequest::get("/articles"), &ClientConfig::default(), &store);
        assert!(request.headers.is_empty());
    }

    #[test]
    fn query_and_json_body_are_recorded() {
        let request = ApiRequest::get("/articles")
            .with_query("page", 2)
            .with_json(&serde_json::json!({"a": 1}))
            .expect("json body");
        assert_eq!(request.query, vec![("page".to_string(), "2".to_string())]);
        assert!(request.body.is_some());
    }
}
