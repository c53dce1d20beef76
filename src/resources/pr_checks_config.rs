//! Pull request checks configuration.

use std::collections::BTreeMap;

use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_owner;

/// One named check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Whether the check runs.
    pub enabled: bool,
    /// Check-specific settings, passed through untouched.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, serde_json::Value>,
}

/// Which check groups run on one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoChecks {
    /// Baseline check.
    pub baseline_check: bool,
    /// Required checks.
    pub required_checks: bool,
    /// Optional checks.
    pub optional_checks: bool,
}

/// The owner's full checks configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrChecksConfig {
    /// Check name to configuration.
    pub checks: BTreeMap<String, CheckConfig>,
    /// Repository name to enabled check groups.
    pub repos: BTreeMap<String, RepoChecks>,
    /// Run the baseline check on repositories added later.
    pub enable_baseline_check_for_all_new_repos: bool,
    /// Run required checks on repositories added later.
    pub enable_required_checks_for_all_new_repos: bool,
    /// Run optional checks on repositories added later.
    pub enable_optional_checks_for_all_new_repos: bool,
}

impl PrChecksConfig {
    /// `true` when any of the three "for all new repos" flags is set.
    #[must_use]
    pub const fn applies_to_new_repos(&self) -> bool {
        self.enable_baseline_check_for_all_new_repos
            || self.enable_required_checks_for_all_new_repos
            || self.enable_optional_checks_for_all_new_repos
    }

    /// Per-repository entry carrying the three blanket flags.
    #[must_use]
    pub const fn blanket_repo_checks(&self) -> RepoChecks {
        RepoChecks {
            baseline_check: self.enable_baseline_check_for_all_new_repos,
            required_checks: self.enable_required_checks_for_all_new_repos,
            optional_checks: self.enable_optional_checks_for_all_new_repos,
        }
    }

    /// Adds a blanket entry for every repository in `existing` that this
    /// config does not mention. Entries already present are kept as given.
    pub fn seed_missing_repos(&mut self, existing: &Self) {
        let seeded = self.blanket_repo_checks();
        for repo in existing.repos.keys() {
            self.repos.entry(repo.clone()).or_insert(seeded);
        }
    }

    /// Every check off with its settings cleared, every repository and
    /// blanket flag off.
    pub fn disable_all(&mut self) {
        for check in self.checks.values_mut() {
            check.enabled = false;
            check.settings.clear();
        }
        for repo in self.repos.values_mut() {
            *repo = RepoChecks::default();
        }
        self.enable_baseline_check_for_all_new_repos = false;
        self.enable_required_checks_for_all_new_repos = false;
        self.enable_optional_checks_for_all_new_repos = false;
    }
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn pr_checks_config_url(&self, owner: &str) -> String {
        self.github_url(&[owner, "checks", "config"])
    }

    /// Fetches the owner's checks configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// or decode error of the request.
    pub async fn get_pr_checks_config(&self, owner: &str) -> Result<PrChecksConfig, ApiError> {
        require_owner(owner)?;
        self.get_json("PR checks config", self.pr_checks_config_url(owner))
            .await
    }

    /// Writes the owner's checks configuration.
    ///
    /// When any blanket flag is set, the existing configuration is fetched
    /// first and every repository it lists but `config` does not gets an
    /// entry carrying the blanket flags. Repositories named in `config` are
    /// sent exactly as given.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the error of
    /// whichever request failed.
    pub async fn update_pr_checks_config(
        &self,
        owner: &str,
        config: &PrChecksConfig,
    ) -> Result<(), ApiError> {
        require_owner(owner)?;
        if !config.applies_to_new_repos() {
            return self.put_pr_checks_config(owner, config).await;
        }

        let existing = self.get_pr_checks_config(owner).await?;
        let mut merged = config.clone();
        merged.seed_missing_repos(&existing);
        self.put_pr_checks_config(owner, &merged).await
    }

    /// Switches every check off and writes the result back; the endpoint has
    /// no DELETE verb.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever request failed.
    pub async fn delete_pr_checks_config(&self, owner: &str) -> Result<(), ApiError> {
        let mut config = self.get_pr_checks_config(owner).await?;
        config.disable_all();
        self.put_pr_checks_config(owner, &config).await
    }

    async fn put_pr_checks_config(&self, owner: &str, config: &PrChecksConfig) -> Result<(), ApiError> {
        self.send_json(
            "PR checks config",
            Method::PUT,
            self.pr_checks_config_url(owner),
            config,
        )
        .await
        .map(drop)
    }
}
