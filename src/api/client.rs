//! Client facade shared by the resource modules.

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;

use super::credentials::ClientConfig;
use super::error_mapping::{map_decode_error, map_encode_error};
use super::reqwest_transport::ReqwestTransport;
use super::transport::{ApiRequest, Transport};

/// StepSecurity API client.
///
/// Resource operations (users, run policies, policy-driven PRs and so on) are
/// provided as inherent methods by the modules under [`crate::resources`].
#[derive(Debug, Clone)]
pub struct StepSecurityClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl StepSecurityClient<ReqwestTransport> {
    /// Builds a client backed by the `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` when the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    /// Creates a client from configuration and an explicit transport.
    #[must_use]
    pub const fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Connection settings in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// `{base}/v1/github/{segments...}`, each segment percent-encoded.
    pub(crate) fn github_url(&self, segments: &[&str]) -> String {
        self.github_endpoint(segments).into()
    }

    /// As [`Self::github_url`], for callers that add a query string.
    pub(crate) fn github_endpoint(&self, segments: &[&str]) -> Url {
        self.endpoint(&["v1", "github"], segments)
    }

    /// `{base}/v1/{customer}/{segments...}`, each segment percent-encoded.
    pub(crate) fn customer_url(&self, segments: &[&str]) -> String {
        self.endpoint(&["v1", self.config.customer()], segments)
            .into()
    }

    fn endpoint(&self, prefix: &[&str], segments: &[&str]) -> Url {
        let mut url = self.config.base().clone();
        url.set_query(None);
        url.set_fragment(None);
        // `ClientConfig` only admits http(s) base URLs, which always have
        // path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(prefix).extend(segments);
        }
        url
    }

    pub(crate) async fn get_json<R>(&self, operation: &str, url: String) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let bytes = self
            .transport
            .execute(ApiRequest::new(Method::GET, url))
            .await?;
        decode(operation, &bytes)
    }

    pub(crate) async fn send_json<B>(
        &self,
        operation: &str,
        method: Method,
        url: String,
        body: &B,
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(|error| map_encode_error(operation, &error))?;
        self.transport
            .execute(ApiRequest::new(method, url).with_body(payload))
            .await
    }

    pub(crate) async fn send_json_decoded<B, R>(
        &self,
        operation: &str,
        method: Method,
        url: String,
        body: &B,
    ) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let bytes = self.send_json(operation, method, url, body).await?;
        decode(operation, &bytes)
    }

    pub(crate) async fn delete_resource(&self, url: String) -> Result<(), ApiError> {
        self.transport
            .execute(ApiRequest::new(Method::DELETE, url))
            .await
            .map(drop)
    }
}

fn decode<R>(operation: &str, bytes: &[u8]) -> Result<R, ApiError>
where
    R: DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|error| map_decode_error(operation, &error))
}
