//! `reqwest` implementation of the transport.

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use reqwest::Client;

use crate::error::ApiError;

use super::credentials::{ApiKey, ClientConfig};
use super::error_mapping::{is_success_status, map_reqwest_error, map_status_error};
use super::transport::{ApiRequest, Transport};

/// Transport backed by an async `reqwest` client with bearer authentication.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    api_key: ApiKey,
}

impl ReqwestTransport {
    /// Builds the HTTP client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| ApiError::Configuration {
            message: format!("failed to configure HTTP client: {error}"),
        })?;

        Ok(Self {
            client,
            api_key: config.api_key().clone(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let ApiRequest { method, url, body } = request;
        tracing::debug!(%method, %url, "sending StepSecurity request");

        let mut request_builder = self
            .client
            .request(method.clone(), url.as_str())
            .bearer_auth(self.api_key.value());
        if let Some(payload) = body {
            request_builder = request_builder
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|error| map_reqwest_error(&format!("{method} {url}"), &error))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| map_reqwest_error(&format!("reading {method} {url}"), &error))?;

        tracing::debug!(%method, %url, status = status.as_u16(), "received StepSecurity response");

        if is_success_status(status) {
            Ok(bytes.to_vec())
        } else {
            Err(map_status_error(status, &bytes))
        }
    }
}
