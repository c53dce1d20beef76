//! Policy-driven PR configuration.
//!
//! Callers work with a single [`PolicyDrivenPrPolicy`] per owner. The API
//! stores one configuration per repository (or one under the `[all]` target
//! for the whole organisation), so writes fan out into one request per
//! selected repository and reads fold the per-repository listing back into a
//! single policy.
//!
//! # Partial application
//!
//! Writes are sequential and stop at the first failure. Repositories written
//! before the failure keep the new configuration; nothing is rolled back.
//! Each per-repository write is idempotent, so re-running the whole operation
//! is the way to recover.

mod controls;
mod internal;
mod model;

pub use controls::Control;
pub use model::{AutoRemediationOptions, DependabotConfig, PolicyDrivenPrPolicy, RepoSelection};

use http::Method;

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_owner;
use internal::{
    ALL_REPOS_TARGET, PolicyDrivenPrConfigOptions, PolicyDrivenPrInternal, SELECT_ALL_REPOS,
    build_config_options, fold_configs, full_name,
};

/// Maps the flat-list markers for "every repository" onto the `[all]` target.
fn repo_target(repo: &str) -> &str {
    if repo == SELECT_ALL_REPOS {
        ALL_REPOS_TARGET
    } else {
        repo
    }
}

/// Rejects policies that would write nothing, and repo-level selections that
/// name the organisation-wide target or a blank repository.
fn validate_policy(policy: &PolicyDrivenPrPolicy) -> Result<(), ApiError> {
    if policy.owner.trim().is_empty() {
        return Err(ApiError::EmptyPolicy);
    }
    let RepoSelection::RepoLevel(repos) = &policy.selection else {
        return Ok(());
    };
    if repos.is_empty() {
        return Err(ApiError::EmptyPolicy);
    }
    let rejected = repos.iter().find(|repo| {
        let name = repo.trim();
        name.is_empty() || name == SELECT_ALL_REPOS || name == ALL_REPOS_TARGET
    });
    if let Some(repo) = rejected {
        return Err(ApiError::InvalidInput {
            message: format!(
                "repo-level selection cannot contain {repo:?}; use RepoSelection::OrgLevel for every repository"
            ),
        });
    }
    Ok(())
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn policy_driven_pr_url(&self, owner: &str, repo: &str) -> String {
        self.github_url(&[owner, repo_target(repo), "policy-driven-pr", "configs"])
    }

    /// Applies a policy to its selected repositories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::EmptyPolicy` when the owner is blank or a repo-level
    /// selection names no repositories, and `ApiError::InvalidInput` when a
    /// repo-level selection contains a blank name, `*` or `[all]`. Otherwise
    /// returns the first transport error. Repositories written before a
    /// failure are not rolled back. A repository listed twice is written once.
    pub async fn create_policy_driven_pr_policy(
        &self,
        policy: &PolicyDrivenPrPolicy,
    ) -> Result<(), ApiError> {
        validate_policy(policy)?;
        self.write_policy_driven_pr_policy(policy).await
    }

    /// Removes the configuration from `removed_repos`, then applies the
    /// policy to its current selection.
    ///
    /// # Errors
    ///
    /// As [`Self::create_policy_driven_pr_policy`]. A failed delete aborts
    /// before any write is attempted.
    pub async fn update_policy_driven_pr_policy(
        &self,
        policy: &PolicyDrivenPrPolicy,
        removed_repos: &[String],
    ) -> Result<(), ApiError> {
        validate_policy(policy)?;
        for repo in removed_repos {
            self.delete_policy_driven_pr_config(&policy.owner, repo)
                .await?;
        }
        self.write_policy_driven_pr_policy(policy).await
    }

    /// Reads every stored configuration for `owner` and folds it into one
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport or
    /// decode error of the listing request.
    pub async fn get_policy_driven_pr_policy(
        &self,
        owner: &str,
    ) -> Result<PolicyDrivenPrPolicy, ApiError> {
        require_owner(owner)?;
        let entries: Vec<PolicyDrivenPrInternal> = self
            .get_json(
                "policy-driven PR configs",
                self.policy_driven_pr_url(owner, ALL_REPOS_TARGET),
            )
            .await?;
        Ok(fold_configs(owner, entries))
    }

    /// Deletes the configuration of each listed repository. `*` deletes the
    /// organisation-wide configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the first
    /// transport error; later repositories are then left untouched.
    pub async fn delete_policy_driven_pr_policy(
        &self,
        owner: &str,
        repos: &[String],
    ) -> Result<(), ApiError> {
        require_owner(owner)?;
        for repo in repos {
            self.delete_policy_driven_pr_config(owner, repo).await?;
        }
        Ok(())
    }

    async fn delete_policy_driven_pr_config(&self, owner: &str, repo: &str) -> Result<(), ApiError> {
        self.delete_resource(self.policy_driven_pr_url(owner, repo))
            .await
    }

    async fn post_policy_driven_pr_config(
        &self,
        owner: &str,
        repo: &str,
        config: &PolicyDrivenPrConfigOptions,
    ) -> Result<(), ApiError> {
        let target = repo_target(repo);
        let body = PolicyDrivenPrInternal {
            full_name: full_name(owner, target),
            config: config.clone(),
        };
        self.send_json(
            "policy-driven PR config",
            Method::POST,
            self.policy_driven_pr_url(owner, target),
            &body,
        )
        .await
        .map(drop)
    }

    async fn write_policy_driven_pr_policy(
        &self,
        policy: &PolicyDrivenPrPolicy,
    ) -> Result<(), ApiError> {
        let owner = policy.owner.as_str();
        let config = build_config_options(policy);

        let repos = match &policy.selection {
            RepoSelection::OrgLevel => {
                return self
                    .post_policy_driven_pr_config(owner, ALL_REPOS_TARGET, &config)
                    .await;
            }
            RepoSelection::RepoLevel(repos) => repos,
        };

        let mut unique: Vec<&str> = Vec::with_capacity(repos.len());
        for repo in repos {
            if !unique.contains(&repo.as_str()) {
                unique.push(repo);
            }
        }

        for (written, repo) in unique.into_iter().enumerate() {
            if let Err(error) = self.post_policy_driven_pr_config(owner, repo, &config).await {
                if written > 0 {
                    tracing::warn!(
                        owner,
                        failed_repo = %repo,
                        written,
                        "policy-driven PR write stopped part way; earlier repositories keep the new configuration"
                    );
                }
                return Err(error);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
