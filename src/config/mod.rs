//! Client configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – the public StepSecurity API endpoint
//! 2. **Configuration file** – `.stepsecurity.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `STEPSECURITY_API_KEY`,
//!    `STEPSECURITY_CUSTOMER`, ... or the unprefixed `STEP_SECURITY_API_KEY`,
//!    `STEP_SECURITY_CUSTOMER` and `STEP_SECURITY_API_BASE_URL`
//! 4. **Command-line arguments** – `--api-key`, `--customer`, `--owner`, ...
//!
//! # Configuration File
//!
//! ```toml
//! api_base_url = "https://agent.api.stepsecurity.io"
//! api_key = "step_example"
//! customer = "acme"
//! owner = "octo"
//! timeout_secs = 30
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::api::{ApiKey, ClientConfig};
use crate::error::ApiError;

/// Endpoint used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://agent.api.stepsecurity.io";

/// Unprefixed API key variable, checked after every other source.
pub const API_KEY_ENV: &str = "STEP_SECURITY_API_KEY";

/// Unprefixed customer variable, checked after every other source.
pub const CUSTOMER_ENV: &str = "STEP_SECURITY_CUSTOMER";

/// Unprefixed base URL variable, checked after every other source.
pub const API_BASE_URL_ENV: &str = "STEP_SECURITY_API_BASE_URL";

/// StepSecurity client configuration supporting CLI, environment, and file
/// sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use stepsecurity::StepSecurityConfig;
///
/// let config = StepSecurityConfig::load().expect("failed to load configuration");
/// let client_config = config.client_config().expect("incomplete configuration");
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "STEPSECURITY",
    discovery(
        dotfile_name = ".stepsecurity.toml",
        config_file_name = "stepsecurity.toml",
        app_name = "stepsecurity"
    )
)]
pub struct StepSecurityConfig {
    /// API base URL without the `/v1` suffix.
    ///
    /// Can be provided via:
    /// - CLI: `--api-base-url <URL>`
    /// - Environment: `STEPSECURITY_API_BASE_URL` or `STEP_SECURITY_API_BASE_URL`
    /// - Config file: `api_base_url = "..."`
    pub api_base_url: Option<String>,

    /// API key sent as a bearer token.
    ///
    /// Can be provided via:
    /// - CLI: `--api-key <KEY>` or `-k <KEY>`
    /// - Environment: `STEPSECURITY_API_KEY` or `STEP_SECURITY_API_KEY`
    /// - Config file: `api_key = "..."`
    #[ortho_config(cli_short = 'k')]
    pub api_key: Option<String>,

    /// Customer identifier used in customer-scoped paths.
    ///
    /// Can be provided via:
    /// - CLI: `--customer <ID>` or `-c <ID>`
    /// - Environment: `STEPSECURITY_CUSTOMER` or `STEP_SECURITY_CUSTOMER`
    /// - Config file: `customer = "..."`
    #[ortho_config(cli_short = 'c')]
    pub customer: Option<String>,

    /// GitHub organisation or account to inspect.
    ///
    /// Can be provided via:
    /// - CLI: `--owner <OWNER>` or `-o <OWNER>`
    /// - Environment: `STEPSECURITY_OWNER`
    /// - Config file: `owner = "..."`
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Per-request timeout in seconds. Unset means no timeout.
    pub timeout_secs: Option<u64>,
}

impl StepSecurityConfig {
    /// Resolves the API key from configuration or `STEP_SECURITY_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when no source provides a
    /// non-blank key.
    pub fn resolve_api_key(&self) -> Result<ApiKey, ApiError> {
        let raw = resolve(self.api_key.as_deref(), API_KEY_ENV).ok_or_else(|| {
            ApiError::Configuration {
                message: format!("API key is required (use --api-key or {API_KEY_ENV})"),
            }
        })?;
        ApiKey::new(raw)
    }

    /// Resolves the customer identifier from configuration or
    /// `STEP_SECURITY_CUSTOMER`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when no source provides one.
    pub fn resolve_customer(&self) -> Result<String, ApiError> {
        resolve(self.customer.as_deref(), CUSTOMER_ENV).ok_or_else(|| ApiError::Configuration {
            message: format!("customer is required (use --customer or {CUSTOMER_ENV})"),
        })
    }

    /// Resolves the base URL, falling back to `STEP_SECURITY_API_BASE_URL`
    /// and then [`DEFAULT_API_BASE_URL`].
    #[must_use]
    pub fn resolve_api_base_url(&self) -> String {
        resolve(self.api_base_url.as_deref(), API_BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
    }

    /// Returns the owner or an error if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when no owner is configured.
    pub fn require_owner(&self) -> Result<&str, ApiError> {
        self.owner
            .as_deref()
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .ok_or_else(|| ApiError::Configuration {
                message: "owner is required (use --owner or -o)".to_owned(),
            })
    }

    /// Validates the configuration into the settings a client is built
    /// from.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the key or customer is
    /// missing, or when the base URL is not a usable `http`/`https` URL.
    pub fn client_config(&self) -> Result<ClientConfig, ApiError> {
        let api_key = self.resolve_api_key()?;
        let customer = self.resolve_customer()?;
        let client_config = ClientConfig::new(self.resolve_api_base_url(), api_key, customer)?;
        Ok(match self.timeout_secs {
            Some(seconds) if seconds > 0 => client_config.with_timeout(Duration::from_secs(seconds)),
            _ => client_config,
        })
    }
}

/// Configured value if non-blank, otherwise the named environment variable if
/// non-blank.
fn resolve(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .or_else(|| {
            env::var(env_var)
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        })
}
