//! Known remediation controls and their wire names.

use super::model::AutoRemediationOptions;

/// A remediation the API can apply to a repository.
///
/// This is the only place wire names appear; both the write and the read
/// path go through [`Control::wire_name`] and [`Control::from_wire_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Control {
    /// Add Harden-Runner to workflows.
    HardenRunner,
    /// Pin actions to commit SHAs.
    PinActions,
    /// Restrict `GITHUB_TOKEN` permissions.
    RestrictTokenPermissions,
    /// Pin Dockerfile base images.
    SecureDockerfile,
    /// Replace unmaintained actions with maintained equivalents.
    ReplaceUnmaintainedActions,
    /// Update pre-commit configuration files.
    UpdatePrecommitFile,
    /// Update the Dependabot configuration file.
    UpdateDependabotFile,
    /// Add workflows to the repository.
    AddWorkflows,
}

impl Control {
    /// Every control, in wire order.
    pub const ALL: [Self; 8] = [
        Self::HardenRunner,
        Self::PinActions,
        Self::RestrictTokenPermissions,
        Self::SecureDockerfile,
        Self::ReplaceUnmaintainedActions,
        Self::UpdatePrecommitFile,
        Self::UpdateDependabotFile,
        Self::AddWorkflows,
    ];

    /// Key used in the `control_checks` map.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::HardenRunner => "HardenRunner",
            Self::PinActions => "PinActions",
            Self::RestrictTokenPermissions => "RestrictGitHubTokenPermissions",
            Self::SecureDockerfile => "SecureDockerFile",
            Self::ReplaceUnmaintainedActions => "ReplaceActions",
            Self::UpdatePrecommitFile => "UpdatePrecommitFile",
            Self::UpdateDependabotFile => "UpdateDependabotFile",
            Self::AddWorkflows => "AddWorkflows",
        }
    }

    /// Looks a control up by its wire name.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| control.wire_name() == name)
    }

    /// Whether the options ask for this control.
    pub(super) fn is_requested(self, options: &AutoRemediationOptions) -> bool {
        match self {
            Self::HardenRunner => options.harden_github_hosted_runner,
            Self::PinActions => options.pin_actions_to_sha,
            Self::RestrictTokenPermissions => options.restrict_github_token_permissions,
            Self::SecureDockerfile => options.secure_docker_file,
            Self::ReplaceUnmaintainedActions => {
                !options.actions_to_replace_with_step_security_actions.is_empty()
            }
            Self::UpdatePrecommitFile => !options.update_precommit_file.is_empty(),
            Self::UpdateDependabotFile => !options.package_ecosystem.is_empty(),
            Self::AddWorkflows => !options.add_workflows.is_empty(),
        }
    }

    /// Boolean toggle backing this control, for the controls that have one.
    ///
    /// List-driven controls return `None`; their state is rebuilt from the
    /// control settings instead.
    pub(super) const fn toggle_mut(
        self,
        options: &mut AutoRemediationOptions,
    ) -> Option<&mut bool> {
        match self {
            Self::HardenRunner => Some(&mut options.harden_github_hosted_runner),
            Self::PinActions => Some(&mut options.pin_actions_to_sha),
            Self::RestrictTokenPermissions => Some(&mut options.restrict_github_token_permissions),
            Self::SecureDockerfile => Some(&mut options.secure_docker_file),
            Self::ReplaceUnmaintainedActions
            | Self::UpdatePrecommitFile
            | Self::UpdateDependabotFile
            | Self::AddWorkflows => None,
        }
    }
}
