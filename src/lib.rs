//! StepSecurity API client library.
//!
//! The crate wraps the StepSecurity REST API behind a single
//! [`StepSecurityClient`]. Resource modules add typed CRUD operations for
//! users, notification settings, PR checks, PR templates, run policies,
//! policy-store policies and suppression rules, and translate the
//! caller-facing [`PolicyDrivenPrPolicy`] into the per-repository
//! configurations the API stores.
//!
//! Requests go through the [`Transport`] trait; [`ReqwestTransport`] is the
//! production implementation.

pub mod api;
pub mod config;
pub mod error;
pub mod resources;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

#[cfg(test)]
mod fixtures;

pub use api::{ApiKey, ApiRequest, ClientConfig, ReqwestTransport, StepSecurityClient, Transport};
pub use config::StepSecurityConfig;
pub use error::ApiError;
pub use resources::policy_driven_prs::{
    AutoRemediationOptions, Control, DependabotConfig, PolicyDrivenPrPolicy, RepoSelection,
};
