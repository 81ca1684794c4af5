//! API client over a pluggable HTTP transport.

use crate::api::request::{decorate, ApiRequest};
use crate::api::response::{map_error_response, ApiEnvelope, ApiError, ApiResponse, ApiResult, TransportError};
use crate::auth::store::CredentialStore;
use crate::config::ClientConfig;
use log::{error, info};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// HTTP collaborator. The client never talks to the network directly.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).send(url, request).await
    }
}

/// Decorates outbound requests and maps inbound failures.
pub struct ApiClient<T: HttpTransport, S: CredentialStore> {
    transport: T,
    store: S,
    config: ClientConfig,
}

impl<T: HttpTransport, S: CredentialStore> ApiClient<T, S> {
    pub fn new(transport: T, store: S, config: ClientConfig) -> Self {
        Self {
            transport,
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends one request; non-2xx statuses become `ApiError`.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let started_at = Instant::now();
        let request = decorate(request, &self.config, &self.store);
        let url = self.config.endpoint_url(request.path.as_str());

        let response = match self.transport.send(url.as_str(), &request).await {
            Ok(response) => response,
            Err(err) => {
                error!(
                    "event=api_request module=api status=error method={} path={} duration_ms={} error_code=transport_failed",
                    request.method,
                    request.path,
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };

        info!(
            "event=api_request module=api status={} method={} path={} http_status={} duration_ms={}",
            if response.is_success() { "ok" } else { "error" },
            request.method,
            request.path,
            response.status,
            started_at.elapsed().as_millis()
        );

        if response.is_success() {
            Ok(response)
        } else {
            Err(map_error_response(&response, &self.store))
        }
    }

    /// Sends and decodes the `{ success, message, data }` envelope.
    ///
    /// A 2xx envelope with `success: false` becomes `ApiError::Rejected`.
    pub async fn send_envelope<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> ApiResult<ApiEnvelope<R>> {
        let response = self.send(request).await?;
        let envelope: ApiEnvelope<R> = serde_json::from_value(response.body)?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope
                    .message
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            });
        }
        Ok(envelope)
    }

    /// Like `send_envelope` but requires `data` to be present.
    pub async fn fetch_data<R: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<R> {
        let envelope = self.send_envelope::<R>(request).await?;
        envelope.data.ok_or_else(|| ApiError::Rejected {
            message: envelope
                .message
                .unwrap_or_else(|| "response carried no data".to_string()),
        })
    }
}
