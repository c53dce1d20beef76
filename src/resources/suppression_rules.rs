//! Customer-scoped suppression rules for detections.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_key;

/// Rule that reclassifies or silences detections matching its conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionRule {
    /// Server-assigned identifier; empty before creation.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Rule name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Detection type the rule applies to, e.g.
    /// `anomalous_outbound_network_call`.
    #[serde(rename = "type")]
    pub rule_type: String,
    /// What happens to matching detections, e.g. `ignore`.
    pub action: String,
    /// Field name to value; all must match.
    pub conditions: BTreeMap<String, String>,
    /// Creator, set by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Creation time, set by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn detection_rules_url(&self) -> String {
        self.customer_url(&["detection-rules"])
    }

    fn detection_rule_url(&self, rule_id: &str) -> String {
        self.customer_url(&["detection-rules", rule_id])
    }

    /// Creates a rule and returns it with its identifier.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error of the request.
    pub async fn create_suppression_rule(
        &self,
        rule: &SuppressionRule,
    ) -> Result<SuppressionRule, ApiError> {
        self.send_json_decoded(
            "create suppression rule",
            Method::POST,
            self.detection_rules_url(),
            rule,
        )
        .await
    }

    /// Fetches a rule.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank identifier, or the
    /// transport or decode error of the request.
    pub async fn get_suppression_rule(&self, rule_id: &str) -> Result<SuppressionRule, ApiError> {
        require_key("suppression rule ID", rule_id)?;
        self.get_json("get suppression rule", self.detection_rule_url(rule_id))
            .await
    }

    /// Replaces a rule.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` when the rule has no identifier, or
    /// the transport error of the request.
    pub async fn update_suppression_rule(&self, rule: &SuppressionRule) -> Result<(), ApiError> {
        require_key("suppression rule ID", &rule.id)?;
        self.send_json(
            "update suppression rule",
            Method::PUT,
            self.detection_rule_url(&rule.id),
            rule,
        )
        .await
        .map(drop)
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank identifier, or the
    /// transport error of the request.
    pub async fn delete_suppression_rule(&self, rule_id: &str) -> Result<(), ApiError> {
        require_key("suppression rule ID", rule_id)?;
        self.delete_resource(self.detection_rule_url(rule_id))
            .await
    }
}
