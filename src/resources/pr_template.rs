//! Template used for pull requests raised by StepSecurity.

use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_owner;

/// Pull request template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrTemplate {
    /// Pull request title.
    pub title: String,
    /// Pull request body.
    pub summary: String,
    /// Commit message for the remediation commit.
    pub commit_message: String,
    /// Labels applied to the pull request.
    pub labels: Vec<String>,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    fn pr_template_url(&self, owner: &str) -> String {
        self.github_url(&[owner, "pr-template"])
    }

    /// Fetches the owner's PR template.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// or decode error of the request.
    pub async fn get_pr_template(&self, owner: &str) -> Result<PrTemplate, ApiError> {
        require_owner(owner)?;
        self.get_json("PR template", self.pr_template_url(owner))
            .await
    }

    /// Overwrites the owner's PR template.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank owner, or the transport
    /// error of the request.
    pub async fn update_pr_template(&self, owner: &str, template: &PrTemplate) -> Result<(), ApiError> {
        require_owner(owner)?;
        self.send_json(
            "PR template",
            Method::POST,
            self.pr_template_url(owner),
            template,
        )
        .await
        .map(drop)
    }

    /// Resets the template by posting a blank one; the endpoint has no
    /// DELETE verb.
    ///
    /// # Errors
    ///
    /// As [`Self::update_pr_template`].
    pub async fn delete_pr_template(&self, owner: &str) -> Result<(), ApiError> {
        self.update_pr_template(owner, &PrTemplate::default()).await
    }
}
