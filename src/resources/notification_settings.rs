//! Run notification settings for an owner.
//!
//! The endpoint has no DELETE verb and accepts POST for both create and
//! update, so deleting means overwriting with blank destinations and every
//! event switched off.

use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_owner;

const DISABLED: &str = "false";

/// Event flags. The API encodes each flag as the string `"true"` or
/// `"false"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationEvents {
    /// Outbound call to a blocked domain.
    pub domain_blocked: String,
    /// Source file overwritten during a run.
    pub file_overwritten: String,
    /// Endpoint not seen in earlier runs.
    pub new_endpoint_discovered: String,
    /// HTTPS request flagged as suspicious.
    pub https_detections: String,
    /// Secret found in build logs.
    pub secrets_detected: String,
    /// Secret found in uploaded artifacts.
    pub artifacts_secrets_detected: String,
    /// Imposter commit referenced by a workflow.
    pub imposter_commits_detected: String,
    /// Suspicious process started on the runner.
    pub suspicious_process_events: String,
    /// Harden-Runner configuration changed.
    pub harden_runner_config_changes: String,
    /// Action not allowed by the run policy.
    pub non_compliant_actions: String,
}

impl NotificationEvents {
    /// Every flag set to `"false"`.
    #[must_use]
    pub fn all_disabled() -> Self {
        let off = || DISABLED.to_owned();
        Self {
            domain_blocked: off(),
            file_overwritten: off(),
            new_endpoint_discovered: off(),
            https_detections: off(),
            secrets_detected: off(),
            artifacts_secrets_detected: off(),
            imposter_commits_detected: off(),
            suspicious_process_events: off(),
            harden_runner_config_changes: off(),
            non_compliant_actions: off(),
        }
    }
}

/// Where and for which events run notifications are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Slack incoming webhook.
    pub slack_webhook_url: String,
    /// Microsoft Teams incoming webhook.
    pub teams_webhook_url: String,
    /// Notification email address.
    pub email: String,
    /// Event flags.
    pub notification_events: NotificationEvents,
}

impl NotificationSettings {
    /// Blank destinations and all events off; the state a delete leaves.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            notification_events: NotificationEvents::all_disabled(),
            ..Self::default()
        }
    }
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn notification_settings_url(&self, owner: &str) -> String {
        self.github_url(&[owner, "actions", "runs", "notification-settings"])
    }

    /// Fetches the owner's notification settings.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// or decode error of the request.
    pub async fn get_notification_settings(
        &self,
        owner: &str,
    ) -> Result<NotificationSettings, ApiError> {
        require_owner(owner)?;
        self.get_json(
            "notification settings",
            self.notification_settings_url(owner),
        )
        .await
    }

    /// Creates the owner's notification settings.
    ///
    /// # Errors
    ///
    /// As [`Self::update_notification_settings`].
    pub async fn create_notification_settings(
        &self,
        owner: &str,
        settings: &NotificationSettings,
    ) -> Result<(), ApiError> {
        self.update_notification_settings(owner, settings).await
    }

    /// Overwrites the owner's notification settings. The endpoint treats
    /// POST as idempotent, so create and update are the same request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// error of the request.
    pub async fn update_notification_settings(
        &self,
        owner: &str,
        settings: &NotificationSettings,
    ) -> Result<(), ApiError> {
        require_owner(owner)?;
        self.send_json(
            "notification settings",
            Method::POST,
            self.notification_settings_url(owner),
            settings,
        )
        .await
        .map(drop)
    }

    /// Confirms settings exist, then overwrites them with
    /// [`NotificationSettings::disabled`].
    ///
    /// Calling this repeatedly leaves the same state as calling it once.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever request failed. A failed read sends no
    /// write; a failed write leaves the previous settings in place.
    pub async fn delete_notification_settings(&self, owner: &str) -> Result<(), ApiError> {
        self.get_notification_settings(owner).await?;
        self.update_notification_settings(owner, &NotificationSettings::disabled())
            .await
    }
}
