//! Subscription status of a repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::{require_key, require_owner};

/// Subscription state reported for a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionStatus {
    /// e.g. `active`, `trial` or `expired`.
    pub status: String,
    /// Plan name, when subscribed.
    pub plan: Option<String>,
    /// Whether the subscription is a trial.
    pub is_trial: bool,
    /// End of the current subscription period.
    pub expires_at: Option<DateTime<Utc>>,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    /// Fetches the subscription status of `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner or repository, or
    /// the transport or decode error of the request.
    pub async fn get_subscription_status(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<SubscriptionStatus, ApiError> {
        require_owner(owner)?;
        require_key("repository", repo)?;
        self.get_json(
            "subscription status",
            self.github_url(&[owner, repo, "actions", "subscription-status"]),
        )
        .await
    }
}
