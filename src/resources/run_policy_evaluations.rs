//! Results of evaluating run policies against workflow runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_owner;

/// Outcome of one policy for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyResult {
    /// Policy identifier.
    pub policy_id: String,
    /// Policy name.
    pub policy_name: String,
    /// `allowed`, `blocked` or `dry_run_blocked`.
    pub status: String,
    /// Human-readable violations.
    pub violations: Vec<String>,
}

/// One evaluated workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunPolicyEvaluation {
    /// Owner of the repository.
    pub owner: String,
    /// `owner/repo` of the run.
    pub repo_full_name: String,
    /// GitHub workflow run identifier.
    pub workflow_run_id: u64,
    /// Workflow display name.
    pub workflow_name: String,
    /// Branch the run was triggered on.
    pub head_branch: String,
    /// Commit the run was triggered on.
    pub head_sha: String,
    /// Overall status of the evaluation.
    pub status: String,
    /// Evaluation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Per-policy outcomes.
    pub policy_results: Vec<PolicyResult>,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    /// Lists evaluations for an owner, or for one repository when `repo` is
    /// given, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport or
    /// decode error of the request.
    pub async fn list_run_policy_evaluations(
        &self,
        owner: &str,
        repo: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<RunPolicyEvaluation>, ApiError> {
        require_owner(owner)?;
        let mut url = match repo {
            Some(repo_name) => {
                self.github_endpoint(&[owner, repo_name, "actions", "run-policy-evaluations"])
            }
            None => self.github_endpoint(&[owner, "actions", "run-policy-evaluations"]),
        };
        if let Some(filter) = status.filter(|value| !value.is_empty()) {
            url.query_pairs_mut().append_pair("status", filter);
        }

        self.get_json("run policy evaluations", url.into())
            .await
    }
}
