//! In-memory stand-in for the StepSecurity API.
//!
//! [`InMemoryStepSecurity`] implements [`Transport`] over a map of stored
//! documents so round trips can be exercised without a network. Policy-driven
//! PR configs are kept per `full_name` and listed through the owner's `[all]`
//! target the way the real API lists them; every other path stores whatever
//! was last POSTed or PUT there.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use url::Url;

use crate::api::{ApiKey, ApiRequest, ClientConfig, StepSecurityClient, Transport};
use crate::error::ApiError;

const BASE_URL: &str = "http://stepsecurity.invalid";
const POLICY_DRIVEN_PR_SUFFIX: &str = "/policy-driven-pr/configs";
const ALL_REPOS_TARGET: &str = "[all]";

/// A request seen by the in-memory API.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP verb.
    pub method: Method,
    /// URL path, e.g. `/v1/github/octo/api/policy-driven-pr/configs`.
    pub path: String,
    /// Decoded JSON body, if one was sent.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct Store {
    documents: BTreeMap<String, Value>,
    /// Owner to `full_name` to stored entry.
    policy_driven_prs: BTreeMap<String, BTreeMap<String, Value>>,
    failures: Vec<(Method, String, u16)>,
    requests: Vec<RecordedRequest>,
}

/// Transport that serves requests from memory.
#[derive(Debug, Default)]
pub struct InMemoryStepSecurity {
    store: Mutex<Store>,
}

impl InMemoryStepSecurity {
    /// Creates an empty in-memory API.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a client for customer `acme` that talks to this instance.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Configuration` if the fixed test configuration is
    /// rejected.
    pub fn client(self: &Arc<Self>) -> Result<StepSecurityClient<Arc<Self>>, ApiError> {
        let config = ClientConfig::new(BASE_URL, ApiKey::new("in-memory-key")?, "acme")?;
        Ok(StepSecurityClient::new(config, Arc::clone(self)))
    }

    /// Makes every later `method` request whose path contains `path_fragment`
    /// fail with `status`.
    pub fn fail_on(&self, method: Method, path_fragment: &str, status: u16) {
        self.lock()
            .failures
            .push((method, path_fragment.to_owned(), status));
    }

    /// Stores a policy-driven PR entry directly, bypassing the client.
    pub fn seed_policy_driven_pr_entry(&self, owner: &str, entry: Value) {
        let full_name = entry
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        self.lock()
            .policy_driven_prs
            .entry(owner.to_owned())
            .or_default()
            .insert(full_name, entry);
    }

    /// Stored policy-driven PR entries for `owner`, keyed by `full_name`.
    #[must_use]
    pub fn policy_driven_pr_entries(&self, owner: &str) -> BTreeMap<String, Value> {
        self.lock()
            .policy_driven_prs
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Forgets the recorded requests, keeping stored data.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store {
    fn handle(&mut self, method: &Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        if let Some((_, _, status)) = self
            .failures
            .iter()
            .find(|(failing_method, fragment, _)| failing_method == method && path.contains(fragment))
        {
            return Err(ApiError::Status {
                status: *status,
                body: "injected failure".to_owned(),
            });
        }

        if let Some((owner, target)) = policy_driven_pr_target(path) {
            return self.handle_policy_driven_pr(method, owner, target, body);
        }

        match *method {
            Method::GET => self.documents.get(path).cloned().ok_or_else(not_found),
            Method::POST | Method::PUT => {
                let stored = body.unwrap_or(Value::Null);
                self.documents.insert(path.to_owned(), stored.clone());
                Ok(stored)
            }
            Method::DELETE => self.documents.remove(path).map(|_| Value::Null).ok_or_else(not_found),
            _ => Err(method_not_allowed()),
        }
    }

    fn handle_policy_driven_pr(
        &mut self,
        method: &Method,
        owner: &str,
        target: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let entries = self.policy_driven_prs.entry(owner.to_owned()).or_default();
        let full_name = format!("{owner}/{target}");
        match *method {
            Method::GET if target == ALL_REPOS_TARGET => {
                Ok(Value::Array(entries.values().cloned().collect()))
            }
            Method::GET => entries.get(&full_name).cloned().ok_or_else(not_found),
            Method::POST => {
                let entry = body.unwrap_or(Value::Null);
                let key = entry
                    .get("full_name")
                    .and_then(Value::as_str)
                    .map_or(full_name, str::to_owned);
                entries.insert(key, entry);
                Ok(Value::Null)
            }
            Method::DELETE => {
                entries.remove(&full_name);
                Ok(Value::Null)
            }
            _ => Err(method_not_allowed()),
        }
    }
}

#[async_trait]
impl Transport for InMemoryStepSecurity {
    async fn execute(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let url = Url::parse(&request.url).map_err(|error| ApiError::InvalidInput {
            message: format!("request URL is invalid: {error}"),
        })?;
        let path = url.path().to_owned();
        let body = request
            .body
            .as_deref()
            .map(serde_json::from_slice::<Value>)
            .transpose()
            .map_err(|error| ApiError::Decode {
                operation: "in-memory request".to_owned(),
                message: error.to_string(),
            })?;

        let mut store = self.lock();
        store.requests.push(RecordedRequest {
            method: request.method.clone(),
            path: path.clone(),
            body: body.clone(),
        });
        let response = store.handle(&request.method, &path, body)?;
        drop(store);

        if response.is_null() {
            return Ok(Vec::new());
        }
        serde_json::to_vec(&response).map_err(|error| ApiError::Encode {
            operation: "in-memory response".to_owned(),
            message: error.to_string(),
        })
    }
}

/// Splits `/v1/github/{owner}/{target}/policy-driven-pr/configs`.
fn policy_driven_pr_target(path: &str) -> Option<(&str, &str)> {
    let scoped = path
        .strip_prefix("/v1/github/")?
        .strip_suffix(POLICY_DRIVEN_PR_SUFFIX)?;
    scoped.split_once('/')
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        body: "not found".to_owned(),
    }
}

fn method_not_allowed() -> ApiError {
    ApiError::Status {
        status: 405,
        body: "method not allowed".to_owned(),
    }
}
