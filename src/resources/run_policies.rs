//! Run policies enforced on workflow runs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::{require_key, require_owner};

/// Constraints a run policy enforces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunPolicyConfig {
    /// Owner the policy belongs to.
    pub owner: String,
    /// Policy name.
    pub name: String,
    /// Restrict which actions may run.
    pub enable_action_policy: bool,
    /// Allowed actions, action reference to allowed version pattern.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub allowed_actions: BTreeMap<String, String>,
    /// Restrict which runner labels jobs may target.
    pub enable_runs_on_policy: bool,
    /// Runner labels jobs may target.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_runner_labels: Vec<String>,
    /// Block runs that expose secrets to untrusted code.
    pub enable_secrets_policy: bool,
    /// Block runs that use known-compromised actions.
    pub enable_compromised_actions_policy: bool,
    /// Report violations without blocking.
    pub is_dry_run: bool,
}

/// A run policy and its scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunPolicy {
    /// Server-assigned identifier; empty before creation.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub policy_id: String,
    /// Owner the policy belongs to.
    pub owner: String,
    /// Customer the policy belongs to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub customer: String,
    /// Policy name.
    pub name: String,
    /// Apply to every repository of the owner.
    pub all_repos: bool,
    /// Apply to every organisation of the customer.
    pub all_orgs: bool,
    /// Repositories the policy applies to when not applied to all.
    pub repositories: Vec<String>,
    /// The constraints.
    pub policy_config: RunPolicyConfig,
    /// Creator, set by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time, set by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last editor, set by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
    /// Last edit time, set by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn run_policies_url(&self, owner: &str) -> String {
        self.github_url(&[owner, "actions", "run-policies"])
    }

    fn run_policy_url(&self, owner: &str, policy_id: &str) -> String {
        self.github_url(&[owner, "actions", "run-policies", policy_id])
    }

    /// Lists the owner's run policies.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// or decode error of the request.
    pub async fn list_run_policies(&self, owner: &str) -> Result<Vec<RunPolicy>, ApiError> {
        require_owner(owner)?;
        self.get_json("list run policies", self.run_policies_url(owner))
            .await
    }

    /// Fetches one run policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or identifier, or
    /// the transport or decode error of the request.
    pub async fn get_run_policy(&self, owner: &str, policy_id: &str) -> Result<RunPolicy, ApiError> {
        require_owner(owner)?;
        require_key("run policy ID", policy_id)?;
        self.get_json("get run policy", self.run_policy_url(owner, policy_id))
            .await
    }

    /// Creates a run policy and returns it as stored, identifier included.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// or decode error of the request.
    pub async fn create_run_policy(&self, policy: &RunPolicy) -> Result<RunPolicy, ApiError> {
        require_owner(&policy.owner)?;
        self.send_json_decoded(
            "create run policy",
            Method::POST,
            self.run_policies_url(&policy.owner),
            policy,
        )
        .await
    }

    /// Replaces a run policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or identifier, or
    /// the transport error of the request.
    pub async fn update_run_policy(&self, policy: &RunPolicy) -> Result<(), ApiError> {
        require_owner(&policy.owner)?;
        require_key("run policy ID", &policy.policy_id)?;
        self.send_json(
            "update run policy",
            Method::PUT,
            self.run_policy_url(&policy.owner, &policy.policy_id),
            policy,
        )
        .await
        .map(drop)
    }

    /// Deletes a run policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or identifier, or
    /// the transport error of the request.
    pub async fn delete_run_policy(&self, owner: &str, policy_id: &str) -> Result<(), ApiError> {
        require_owner(owner)?;
        require_key("run policy ID", policy_id)?;
        self.delete_resource(self.run_policy_url(owner, policy_id))
            .await
    }
}
