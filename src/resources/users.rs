//! Customer-scoped users and their access policies.

use http::Method;
use serde::{Deserialize, Serialize};

use crate::api::{StepSecurityClient, Transport};
use crate::error::ApiError;

use super::require_key;

/// Access grant attached to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPolicy {
    /// Policy kind, e.g. `github`.
    #[serde(rename = "type")]
    pub policy_type: String,
    /// Role granted, e.g. `admin` or `auditor`.
    pub role: String,
    /// Scope of the grant, e.g. `customer`, `organization` or `repo`.
    pub scope: String,
    /// Organisation the grant is limited to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub organization: String,
    /// Repositories the grant is limited to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub repos: Vec<String>,
}

/// A StepSecurity user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Server-assigned identifier; empty before creation.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// GitHub user name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    /// Email address.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Email domain suffix matching many users at once.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email_suffix: String,
    /// Authentication method, e.g. `Github` or `SSO`.
    pub auth_type: String,
    /// Access grants.
    pub policies: Vec<UserPolicy>,
}

/// Bulk-shaped create request. This client always sends at most one user
/// name and one email.
#[derive(Debug, Serialize)]
struct CreateUsersRequest<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    user_names: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    emails: Vec<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    email_suffix: &'a str,
    auth_type: &'a str,
    policies: &'a [UserPolicy],
}

impl<'a> CreateUsersRequest<'a> {
    fn for_user(user: &'a User) -> Self {
        let single = |value: &'a str| {
            if value.is_empty() {
                Vec::new()
            } else {
                vec![value]
            }
        };
        Self {
            user_names: single(user.user_name.as_str()),
            emails: single(user.email.as_str()),
            email_suffix: user.email_suffix.as_str(),
            auth_type: user.auth_type.as_str(),
            policies: user.policies.as_slice(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateUsersResponse {
    #[serde(default)]
    users_added: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct ListUsersResponse {
    #[serde(default)]
    users: Vec<User>,
}

impl<T> StepSecurityClient<T>
where
    T: Transport,
{
    /// Lists every user of the configured customer.
    ///
    /// # Errors
    ///
    /// Returns the transport or decode error of the request.
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response: ListUsersResponse = self
            .get_json("list users", self.customer_url(&["users"]))
            .await?;
        Ok(response.users)
    }

    /// Fetches one user by identifier.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank identifier, or the
    /// transport or decode error of the request.
    pub async fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        require_key("user ID", user_id)?;
        self.get_json("get user", self.customer_url(&["users", user_id]))
            .await
    }

    /// Creates a user and returns it with its server-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UserCreationFailed` when the response reports no
    /// added users, or the transport or decode error of the request.
    pub async fn create_user(&self, user: &User) -> Result<User, ApiError> {
        let response: CreateUsersResponse = self
            .send_json_decoded(
                "create user",
                Method::POST,
                self.customer_url(&["users"]),
                &CreateUsersRequest::for_user(user),
            )
            .await?;

        let mut added = response.users_added.into_iter();
        let created = added.next().ok_or(ApiError::UserCreationFailed)?;
        if added.next().is_some() {
            tracing::warn!(
                user_name = %user.user_name,
                email = %user.email,
                "create user reported more than one added user; using the first"
            );
        }
        Ok(created)
    }

    /// Replaces a user's settings.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` when the user has no identifier, or
    /// the transport error of the request.
    pub async fn update_user(&self, user: &User) -> Result<(), ApiError> {
        require_key("user ID", &user.id)?;
        self.send_json(
            "update user",
            Method::PUT,
            self.customer_url(&["users", user.id.as_str()]),
            user,
        )
        .await
        .map(drop)
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a blank identifier, or the
    /// transport error of the request.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        require_key("user ID", user_id)?;
        self.delete_resource(self.customer_url(&["users", user_id]))
            .await
    }
}
