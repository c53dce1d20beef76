//! Plumbing shared by every resource client.
//!
//! The [`Transport`] trait executes a single authenticated request and
//! classifies the response. [`StepSecurityClient`] layers URI construction and
//! JSON encoding on top of it; the resource modules add their operations to
//! the client as inherent methods.

mod client;
mod credentials;
mod error_mapping;
mod reqwest_transport;
mod transport;

pub use client::StepSecurityClient;
pub use credentials::{ApiKey, ClientConfig};
pub use reqwest_transport::ReqwestTransport;
pub use transport::{ApiRequest, Transport};

#[cfg(test)]
pub use transport::MockTransport;
