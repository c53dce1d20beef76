//! Caller-facing policy-driven PR policy.

use serde::{Deserialize, Serialize};

use super::internal::{ALL_REPOS_TARGET, SELECT_ALL_REPOS};

/// Dependency-update entry written into the generated Dependabot file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependabotConfig {
    /// Package ecosystem, e.g. `npm` or `github-actions`.
    pub package: String,
    /// Update interval, e.g. `daily` or `weekly`.
    pub interval: String,
}

/// Remediation toggles and their parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRemediationOptions {
    /// Raise pull requests for findings.
    pub create_pr: bool,
    /// Raise GitHub issues for findings.
    pub create_issue: bool,
    /// Raise GitHub Advanced Security alerts.
    pub create_github_advanced_security_alert: bool,
    /// Add Harden-Runner to workflows on GitHub-hosted runners.
    pub harden_github_hosted_runner: bool,
    /// Pin action references to full commit SHAs.
    pub pin_actions_to_sha: bool,
    /// Restrict `GITHUB_TOKEN` permissions to the minimum required.
    pub restrict_github_token_permissions: bool,
    /// Pin base images in Dockerfiles.
    pub secure_docker_file: bool,
    /// Actions left untouched when pinning.
    pub actions_to_exempt_while_pinning: Vec<String>,
    /// Actions to swap for their StepSecurity maintained equivalents.
    pub actions_to_replace_with_step_security_actions: Vec<String>,
    /// Pre-commit configuration files to update.
    pub update_precommit_file: Vec<String>,
    /// Ecosystems to add to the Dependabot configuration.
    pub package_ecosystem: Vec<DependabotConfig>,
    /// Workflows to add, as accepted by the API.
    pub add_workflows: String,
}

/// Which repositories a policy applies to.
///
/// Org level and repo level are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "repos", rename_all = "snake_case")]
pub enum RepoSelection {
    /// Every repository under the owner, through the `[all]` target.
    OrgLevel,
    /// An explicit list of repository names, written in order.
    RepoLevel(Vec<String>),
}

impl Default for RepoSelection {
    fn default() -> Self {
        Self::RepoLevel(Vec::new())
    }
}

impl RepoSelection {
    /// Builds a repo-level selection, dropping duplicates but keeping the
    /// first-seen order.
    #[must_use]
    pub fn repos<I, S>(repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for repo in repos {
            let name = repo.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self::RepoLevel(unique)
    }

    /// Interprets a flat `selected_repos` list, where `*` (or `[all]`)
    /// anywhere in the list selects the whole organisation.
    #[must_use]
    pub fn from_selected_repos<S>(selected: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        if selected
            .iter()
            .any(|repo| matches!(repo.as_ref(), SELECT_ALL_REPOS | ALL_REPOS_TARGET))
        {
            Self::OrgLevel
        } else {
            Self::repos(selected.iter().map(|repo| repo.as_ref().to_owned()))
        }
    }

    /// `true` for [`RepoSelection::OrgLevel`].
    #[must_use]
    pub const fn is_org_level(&self) -> bool {
        matches!(self, Self::OrgLevel)
    }
}

/// Policy-driven PR configuration for one owner, as callers see it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDrivenPrPolicy {
    /// Organisation or account the policy belongs to.
    pub owner: String,
    /// Remediation toggles.
    pub auto_remediation_options: AutoRemediationOptions,
    /// Repositories the policy applies to.
    pub selection: RepoSelection,
}

impl PolicyDrivenPrPolicy {
    /// A policy with every toggle off and nothing selected.
    #[must_use]
    pub fn empty(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// `true` when the policy applies to the whole organisation.
    #[must_use]
    pub const fn use_org_level_config(&self) -> bool {
        self.selection.is_org_level()
    }

    /// `true` when the policy names at least one repository.
    #[must_use]
    pub const fn use_repo_level_config(&self) -> bool {
        match &self.selection {
            RepoSelection::OrgLevel => false,
            RepoSelection::RepoLevel(repos) => !repos.is_empty(),
        }
    }

    /// Flat list view: `["*"]` at org level, otherwise the repository names.
    #[must_use]
    pub fn selected_repos(&self) -> Vec<String> {
        match &self.selection {
            RepoSelection::OrgLevel => vec![SELECT_ALL_REPOS.to_owned()],
            RepoSelection::RepoLevel(repos) => repos.clone(),
        }
    }
}
