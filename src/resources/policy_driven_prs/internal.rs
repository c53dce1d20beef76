//! Vendor-side per-repository configuration and the mapping to and from
//! [`PolicyDrivenPrPolicy`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::controls::Control;
use super::model::{AutoRemediationOptions, DependabotConfig, PolicyDrivenPrPolicy, RepoSelection};

/// Path segment that addresses the organisation-wide configuration.
pub(crate) const ALL_REPOS_TARGET: &str = "[all]";

/// Flat-list marker for "every repository".
pub(crate) const SELECT_ALL_REPOS: &str = "*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ControlCheck {
    pub(crate) trigger_issue: bool,
    pub(crate) trigger_pr: bool,
}

impl ControlCheck {
    const fn is_enabled(self) -> bool {
        self.trigger_issue || self.trigger_pr
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ControlSettings {
    pub(crate) actions_to_exempt_while_pinning: Vec<String>,
    /// Action to replacement. Replacement targets are always empty on write.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) actions_to_replace: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) update_precommit_file: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) package_ecosystem: Vec<DependabotConfig>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) add_workflows: String,
    pub(crate) apply_issue_pr_config_to_all_repos: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PolicyDrivenPrConfigOptions {
    pub(crate) is_org_level_config: bool,
    pub(crate) is_repo_level_config: bool,
    pub(crate) control_checks: BTreeMap<String, ControlCheck>,
    pub(crate) trigger_alert: bool,
    pub(crate) trigger_pr_vs_issue: bool,
    pub(crate) control_settings: ControlSettings,
}

impl PolicyDrivenPrConfigOptions {
    /// A config does something if it raises alerts, raises PRs or issues, or
    /// has at least one control.
    pub(crate) fn is_enabled(&self) -> bool {
        self.trigger_alert || self.trigger_pr_vs_issue || !self.control_checks.is_empty()
    }

    /// Everything except the level flags, which legitimately differ between
    /// entries written by different selections.
    fn shares_settings_with(&self, other: &Self) -> bool {
        self.control_checks == other.control_checks
            && self.trigger_alert == other.trigger_alert
            && self.trigger_pr_vs_issue == other.trigger_pr_vs_issue
            && self.control_settings == other.control_settings
    }
}

/// One entry per `owner/repo` (or `owner/[all]`). Used as the POST body and
/// as the element type of the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PolicyDrivenPrInternal {
    pub(crate) full_name: String,
    #[serde(default)]
    pub(crate) config: PolicyDrivenPrConfigOptions,
}

pub(crate) fn full_name(owner: &str, repo: &str) -> String {
    format!("{owner}/{repo}")
}

/// Builds the payload written to every selected repository.
pub(crate) fn build_config_options(policy: &PolicyDrivenPrPolicy) -> PolicyDrivenPrConfigOptions {
    let options = &policy.auto_remediation_options;
    let org_level = policy.selection.is_org_level();
    let check = ControlCheck {
        trigger_issue: options.create_issue,
        trigger_pr: options.create_pr,
    };

    let control_checks = Control::ALL
        .into_iter()
        .filter(|control| control.is_requested(options))
        .map(|control| (control.wire_name().to_owned(), check))
        .collect();

    let control_settings = ControlSettings {
        actions_to_exempt_while_pinning: options.actions_to_exempt_while_pinning.clone(),
        actions_to_replace: options
            .actions_to_replace_with_step_security_actions
            .iter()
            .map(|action| (action.clone(), String::new()))
            .collect(),
        update_precommit_file: options
            .update_precommit_file
            .iter()
            .map(|file| (file.clone(), true))
            .collect(),
        package_ecosystem: options.package_ecosystem.clone(),
        add_workflows: options.add_workflows.clone(),
        apply_issue_pr_config_to_all_repos: org_level,
    };

    PolicyDrivenPrConfigOptions {
        is_org_level_config: org_level,
        is_repo_level_config: !org_level,
        control_checks,
        trigger_alert: options.create_github_advanced_security_alert,
        trigger_pr_vs_issue: options.create_pr || options.create_issue,
        control_settings,
    }
}

/// Rebuilds the caller-facing options from one stored config.
///
/// `create_pr` and `create_issue` come from the enabled control checks. A
/// config with no enabled known check only carries `trigger_pr_vs_issue`,
/// which is read back as `create_pr`. Replacement targets in
/// `actions_to_replace` are dropped; only the action names come back.
pub(crate) fn options_from_config(config: &PolicyDrivenPrConfigOptions) -> AutoRemediationOptions {
    let mut options = AutoRemediationOptions {
        create_github_advanced_security_alert: config.trigger_alert,
        ..AutoRemediationOptions::default()
    };

    let mut saw_enabled_check = false;
    for (name, check) in &config.control_checks {
        let Some(control) = Control::from_wire_name(name) else {
            tracing::debug!(control = %name, "ignoring unknown policy-driven PR control");
            continue;
        };
        if !check.is_enabled() {
            continue;
        }
        saw_enabled_check = true;
        options.create_pr |= check.trigger_pr;
        options.create_issue |= check.trigger_issue;
        if let Some(toggle) = control.toggle_mut(&mut options) {
            *toggle = true;
        }
    }
    if !saw_enabled_check {
        options.create_pr = config.trigger_pr_vs_issue;
    }

    let settings = &config.control_settings;
    options
        .actions_to_exempt_while_pinning
        .clone_from(&settings.actions_to_exempt_while_pinning);
    options.actions_to_replace_with_step_security_actions =
        settings.actions_to_replace.keys().cloned().collect();
    options.update_precommit_file = settings.update_precommit_file.keys().cloned().collect();
    options
        .package_ecosystem
        .clone_from(&settings.package_ecosystem);
    options.add_workflows.clone_from(&settings.add_workflows);
    options
}

/// Folds every stored config for an owner into one policy.
///
/// An enabled `owner/[all]` entry wins. Otherwise the enabled repo-level
/// entries are assumed to carry identical settings (the write path writes
/// the same payload to each), so the first of them by repository name serves
/// as the template and the selection is the set of their repository names.
/// Divergent entries are reported with a warning; the template still wins. With nothing enabled the
/// empty policy is returned.
pub(crate) fn fold_configs(owner: &str, entries: Vec<PolicyDrivenPrInternal>) -> PolicyDrivenPrPolicy {
    let org_full_name = full_name(owner, ALL_REPOS_TARGET);
    let mut org_config: Option<PolicyDrivenPrConfigOptions> = None;
    let mut repo_configs: BTreeMap<String, PolicyDrivenPrConfigOptions> = BTreeMap::new();

    for entry in entries {
        if entry.full_name == org_full_name {
            org_config = Some(entry.config);
        } else if entry.config.is_enabled() {
            repo_configs.insert(repo_name(owner, &entry.full_name), entry.config);
        }
    }

    if let Some(config) = org_config.filter(PolicyDrivenPrConfigOptions::is_enabled) {
        return PolicyDrivenPrPolicy {
            owner: owner.to_owned(),
            auto_remediation_options: options_from_config(&config),
            selection: RepoSelection::OrgLevel,
        };
    }

    let Some((template_repo, template)) = repo_configs.first_key_value() else {
        return PolicyDrivenPrPolicy::empty(owner);
    };

    let divergent = divergent_repos(template, &repo_configs);
    if !divergent.is_empty() {
        tracing::warn!(
            owner,
            template = %template_repo,
            divergent = ?divergent,
            "policy-driven PR configs differ between repositories; reporting the template's settings"
        );
    }

    PolicyDrivenPrPolicy {
        owner: owner.to_owned(),
        auto_remediation_options: options_from_config(template),
        selection: RepoSelection::repos(repo_configs.keys().cloned()),
    }
}

/// Repositories whose settings differ from `template`'s.
pub(crate) fn divergent_repos<'a>(
    template: &PolicyDrivenPrConfigOptions,
    repo_configs: &'a BTreeMap<String, PolicyDrivenPrConfigOptions>,
) -> Vec<&'a str> {
    repo_configs
        .iter()
        .filter(|(_, config)| !config.shares_settings_with(template))
        .map(|(repo, _)| repo.as_str())
        .collect()
}

fn repo_name(owner: &str, entry_full_name: &str) -> String {
    entry_full_name
        .strip_prefix(owner)
        .and_then(|rest| rest.strip_prefix('/'))
        .or_else(|| entry_full_name.split_once('/').map(|(_, repo)| repo))
        .unwrap_or(entry_full_name)
        .to_owned()
}
