//! Harden-Runner policies kept in the policy store.

use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::{require_key, require_owner};

/// A named Harden-Runner policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyStorePolicy {
    /// Owner the policy belongs to.
    pub owner: String,
    /// Policy name, unique per owner.
    pub policy_name: String,
    /// `audit` or `block`.
    pub egress_policy: String,
    /// Endpoints allowed when blocking, as `host:port`.
    pub allowed_endpoints: Vec<String>,
    /// Turn off telemetry upload.
    pub disable_telemetry: bool,
    /// Remove sudo from the runner.
    pub disable_sudo: bool,
    /// Turn off file monitoring.
    pub disable_file_monitoring: bool,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn policy_store_url(&self, owner: &str, policy_name: &str) -> String {
        self.github_url(&[owner, "actions", "policies", policy_name])
    }

    /// Stores a policy under its owner and name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or name, or the
    /// transport error of the request.
    pub async fn create_policy_store_policy(
        &self,
        policy: &PolicyStorePolicy,
    ) -> Result<(), ApiError> {
        require_owner(&policy.owner)?;
        require_key("policy name", &policy.policy_name)?;
        self.send_json(
            "policy store policy",
            Method::POST,
            self.policy_store_url(&policy.owner, &policy.policy_name),
            policy,
        )
        .await
        .map(drop)
    }

    /// Fetches a stored policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or name, or the
    /// transport or decode error of the request.
    pub async fn get_policy_store_policy(
        &self,
        owner: &str,
        policy_name: &str,
    ) -> Result<PolicyStorePolicy, ApiError> {
        require_owner(owner)?;
        require_key("policy name", policy_name)?;
        self.get_json(
            "policy store policy",
            self.policy_store_url(owner, policy_name),
        )
        .await
    }

    /// Deletes a stored policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or name, or the
    /// transport error of the request.
    pub async fn delete_policy_store_policy(
        &self,
        owner: &str,
        policy_name: &str,
    ) -> Result<(), ApiError> {
        require_owner(owner)?;
        require_key("policy name", policy_name)?;
        self.delete_resource(self.policy_store_url(owner, policy_name))
            .await
    }
}
