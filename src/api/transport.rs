//! Transport abstraction used by every resource client.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use crate::error::ApiError;

/// A single request to the StepSecurity API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: Method,
    /// Fully qualified request URL.
    pub url: String,
    /// JSON-encoded body, if any.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Builds a request without a body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Attaches a JSON-encoded body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes authenticated requests against the StepSecurity API.
///
/// Implementations return the raw response body for HTTP 200, 201 and 204 and
/// an [`ApiError`] for anything else. They never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response body.
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        (**self).execute(request).await
    }
}
