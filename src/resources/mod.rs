//! Resource clients for the StepSecurity API.
//!
//! Each module adds the operations for one entity to
//! [`crate::StepSecurityClient`] and defines the entity's wire shape.

pub mod notification_settings;
pub mod policy_driven_prs;
pub mod policy_store;
pub mod pr_checks_config;
pub mod pr_template;
pub mod run_policies;
pub mod run_policy_evaluations;
pub mod subscription_status;
pub mod suppression_rules;
pub mod users;

use crate::error::ApiError;

/// Rejects blank path keys before they turn into malformed URLs.
pub(crate) fn require_key(kind: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            message: format!("{kind} is required"),
        });
    }
    Ok(())
}

pub(crate) fn require_owner(owner: &str) -> Result<(), ApiError> {
    require_key("owner", owner)
}
