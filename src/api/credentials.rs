//! Immutable client settings and the API key wrapper.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

/// API key wrapper enforcing presence.
///
/// The `Debug` output never contains the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validates that the key is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` when the supplied string is blank.
    pub fn new(key: impl AsRef<str>) -> Result<Self, ApiError> {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ApiError::Configuration {
                message: "API key is required".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the key value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("ApiKey").field(&"<redacted>").finish()
    }
}

/// Connection settings handed to [`super::StepSecurityClient`] at
/// construction. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    base: Url,
    api_key: ApiKey,
    customer: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Validates the base URL and customer identifier.
    ///
    /// Trailing slashes on the base URL are dropped so path templates can be
    /// appended directly.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` when the base URL is not an absolute
    /// `http`/`https` URL or the customer identifier is blank.
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: ApiKey,
        customer: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let trimmed_base = base_url.as_ref().trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed_base).map_err(|error| ApiError::Configuration {
            message: format!("API base URL is invalid: {error}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ApiError::Configuration {
                message: format!("API base URL must use http or https: {trimmed_base}"),
            });
        }

        let trimmed_customer = customer.as_ref().trim();
        if trimmed_customer.is_empty() {
            return Err(ApiError::Configuration {
                message: "customer identifier is required".to_owned(),
            });
        }

        Ok(Self {
            base_url: trimmed_base.to_owned(),
            base: parsed,
            api_key,
            customer: trimmed_customer.to_owned(),
            timeout: None,
        })
    }

    /// Bounds every request made with this configuration.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub const fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Parsed base URL that endpoint paths are appended to.
    pub(crate) const fn base(&self) -> &Url {
        &self.base
    }

    /// API key used for bearer authentication.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Customer identifier used by customer-scoped endpoints.
    #[must_use]
    pub const fn customer(&self) -> &str {
        self.customer.as_str()
    }

    /// Optional request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
