//! Tests for the policy-driven PR translator and its write and read paths.

use std::collections::BTreeMap;
use std::sync::Arc;

use http::Method;
use mockall::Sequence;
use rstest::{fixture, rstest};
use serde_json::json;

use super::internal::{
    PolicyDrivenPrInternal, build_config_options, divergent_repos, fold_configs,
};
use super::{AutoRemediationOptions, Control, DependabotConfig, PolicyDrivenPrPolicy, RepoSelection};
use crate::api::{ApiKey, ClientConfig, MockTransport, StepSecurityClient};
use crate::error::ApiError;
use crate::test_support::InMemoryStepSecurity;

const CONFIGS_SUFFIX: &str = "/policy-driven-pr/configs";

struct InMemoryFixture {
    api: Arc<InMemoryStepSecurity>,
    client: StepSecurityClient<Arc<InMemoryStepSecurity>>,
}

#[fixture]
fn in_memory() -> InMemoryFixture {
    let api = Arc::new(InMemoryStepSecurity::new());
    let client = api.client().expect("in-memory client should build");
    InMemoryFixture { api, client }
}

fn remediation() -> AutoRemediationOptions {
    AutoRemediationOptions {
        create_pr: true,
        harden_github_hosted_runner: true,
        pin_actions_to_sha: true,
        actions_to_exempt_while_pinning: vec!["actions/checkout".to_owned()],
        ..AutoRemediationOptions::default()
    }
}

fn policy(selection: RepoSelection) -> PolicyDrivenPrPolicy {
    PolicyDrivenPrPolicy {
        owner: "octo".to_owned(),
        auto_remediation_options: remediation(),
        selection,
    }
}

fn configs_path(target: &str) -> String {
    format!("/v1/github/octo/{target}{CONFIGS_SUFFIX}")
}

fn write_paths(api: &InMemoryStepSecurity, method: &Method) -> Vec<String> {
    api.requests()
        .into_iter()
        .filter(|request| &request.method == method)
        .map(|request| request.path)
        .collect()
}

#[test]
fn control_wire_names_round_trip() {
    for control in Control::ALL {
        assert_eq!(Control::from_wire_name(control.wire_name()), Some(control));
    }
    assert_eq!(Control::from_wire_name("NotAControl"), None);
}

#[test]
fn build_config_options_maps_toggles_and_lists() {
    let mut options = remediation();
    options.create_issue = true;
    options.actions_to_replace_with_step_security_actions = vec!["tj-actions/changed-files".to_owned()];
    options.update_precommit_file = vec![".pre-commit-config.yaml".to_owned()];
    options.package_ecosystem = vec![DependabotConfig {
        package: "npm".to_owned(),
        interval: "daily".to_owned(),
    }];
    let input = PolicyDrivenPrPolicy {
        auto_remediation_options: options,
        ..policy(RepoSelection::repos(["api"]))
    };

    let config = build_config_options(&input);

    let encoded = serde_json::to_value(&config).expect("config should encode");
    assert_eq!(
        encoded,
        json!({
            "is_org_level_config": false,
            "is_repo_level_config": true,
            "control_checks": {
                "HardenRunner": { "trigger_issue": true, "trigger_pr": true },
                "PinActions": { "trigger_issue": true, "trigger_pr": true },
                "ReplaceActions": { "trigger_issue": true, "trigger_pr": true },
                "UpdateDependabotFile": { "trigger_issue": true, "trigger_pr": true },
                "UpdatePrecommitFile": { "trigger_issue": true, "trigger_pr": true }
            },
            "trigger_alert": false,
            "trigger_pr_vs_issue": true,
            "control_settings": {
                "actions_to_exempt_while_pinning": ["actions/checkout"],
                "actions_to_replace": { "tj-actions/changed-files": "" },
                "update_precommit_file": { ".pre-commit-config.yaml": true },
                "package_ecosystem": [{ "package": "npm", "interval": "daily" }],
                "apply_issue_pr_config_to_all_repos": false
            }
        })
    );
}

#[test]
fn build_config_options_marks_org_level() {
    let config = build_config_options(&policy(RepoSelection::OrgLevel));

    assert!(config.is_org_level_config);
    assert!(!config.is_repo_level_config);
    assert!(config.control_settings.apply_issue_pr_config_to_all_repos);
}

#[test]
fn all_zero_config_is_not_enabled() {
    let config = build_config_options(&PolicyDrivenPrPolicy::empty("octo"));

    assert!(config.control_checks.is_empty());
    assert!(!config.is_enabled());
}

#[test]
fn fold_configs_without_entries_is_empty_policy() {
    assert_eq!(fold_configs("octo", Vec::new()), PolicyDrivenPrPolicy::empty("octo"));
}

#[test]
fn fold_configs_prefers_enabled_org_entry() {
    let org = PolicyDrivenPrInternal {
        full_name: "octo/[all]".to_owned(),
        config: build_config_options(&policy(RepoSelection::OrgLevel)),
    };
    let stale = PolicyDrivenPrInternal {
        full_name: "octo/legacy".to_owned(),
        config: build_config_options(&PolicyDrivenPrPolicy {
            auto_remediation_options: AutoRemediationOptions {
                create_issue: true,
                secure_docker_file: true,
                ..AutoRemediationOptions::default()
            },
            ..policy(RepoSelection::repos(["legacy"]))
        }),
    };

    let folded = fold_configs("octo", vec![stale, org]);

    assert_eq!(folded, policy(RepoSelection::OrgLevel));
}

#[test]
fn fold_configs_ignores_disabled_org_entry() {
    let org = PolicyDrivenPrInternal {
        full_name: "octo/[all]".to_owned(),
        config: build_config_options(&PolicyDrivenPrPolicy {
            selection: RepoSelection::OrgLevel,
            ..PolicyDrivenPrPolicy::empty("octo")
        }),
    };
    let repo = PolicyDrivenPrInternal {
        full_name: "octo/api".to_owned(),
        config: build_config_options(&policy(RepoSelection::repos(["api"]))),
    };

    let folded = fold_configs("octo", vec![org, repo]);

    assert_eq!(folded, policy(RepoSelection::repos(["api"])));
}

#[test]
fn fold_configs_skips_unknown_controls() {
    let mut config = build_config_options(&policy(RepoSelection::repos(["api"])));
    let pin = config
        .control_checks
        .get("PinActions")
        .copied()
        .expect("PinActions should be present");
    config.control_checks.insert("FutureControl".to_owned(), pin);

    let folded = fold_configs(
        "octo",
        vec![PolicyDrivenPrInternal {
            full_name: "octo/api".to_owned(),
            config,
        }],
    );

    assert_eq!(folded, policy(RepoSelection::repos(["api"])));
}

#[test]
fn fold_configs_uses_first_repo_as_template_when_repos_diverge() {
    let api_config = build_config_options(&policy(RepoSelection::repos(["api"])));
    let web_config = build_config_options(&PolicyDrivenPrPolicy {
        auto_remediation_options: AutoRemediationOptions {
            secure_docker_file: true,
            ..remediation()
        },
        ..policy(RepoSelection::repos(["web"]))
    });
    assert_ne!(api_config.control_checks, web_config.control_checks);
    let entries = vec![
        PolicyDrivenPrInternal {
            full_name: "octo/web".to_owned(),
            config: web_config.clone(),
        },
        PolicyDrivenPrInternal {
            full_name: "octo/api".to_owned(),
            config: api_config.clone(),
        },
    ];

    let folded = fold_configs("octo", entries);

    assert_eq!(folded, policy(RepoSelection::repos(["api", "web"])));
    let repo_configs = BTreeMap::from([
        ("api".to_owned(), api_config.clone()),
        ("web".to_owned(), web_config),
    ]);
    assert_eq!(divergent_repos(&api_config, &repo_configs), vec!["web"]);
}

#[test]
fn divergent_repos_ignores_level_flags() {
    let repo_level = build_config_options(&policy(RepoSelection::repos(["api"])));
    let mut relabelled = build_config_options(&policy(RepoSelection::OrgLevel));
    relabelled.control_settings.apply_issue_pr_config_to_all_repos = false;
    let repo_configs = BTreeMap::from([
        ("api".to_owned(), repo_level.clone()),
        ("web".to_owned(), relabelled),
    ]);

    assert!(divergent_repos(&repo_level, &repo_configs).is_empty());
}

#[rstest]
#[case::empty_repo_level(PolicyDrivenPrPolicy::empty("octo"))]
#[case::blank_owner(PolicyDrivenPrPolicy { owner: "  ".to_owned(), ..policy(RepoSelection::OrgLevel) })]
#[tokio::test]
async fn create_rejects_empty_policy(in_memory: InMemoryFixture, #[case] input: PolicyDrivenPrPolicy) {
    let error = in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect_err("empty policy should be rejected");

    assert_eq!(error, ApiError::EmptyPolicy);
    assert!(in_memory.api.requests().is_empty());
}

#[rstest]
#[case::star("*")]
#[case::all_target("[all]")]
#[case::blank(" ")]
#[tokio::test]
async fn create_rejects_reserved_names_in_repo_level_selection(
    in_memory: InMemoryFixture,
    #[case] reserved: &str,
) {
    let input = policy(RepoSelection::RepoLevel(vec![
        "api".to_owned(),
        reserved.to_owned(),
    ]));

    let error = in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect_err("reserved name should be rejected");

    assert!(
        matches!(error, ApiError::InvalidInput { .. }),
        "expected InvalidInput, got {error:?}"
    );
    assert!(in_memory.api.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn update_rejects_reserved_names_before_deleting(in_memory: InMemoryFixture) {
    let input = policy(RepoSelection::RepoLevel(vec!["[all]".to_owned()]));

    let error = in_memory
        .client
        .update_policy_driven_pr_policy(&input, &["web".to_owned()])
        .await
        .expect_err("reserved name should be rejected");

    assert!(matches!(error, ApiError::InvalidInput { .. }));
    assert!(in_memory.api.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn repo_listed_twice_is_written_once(in_memory: InMemoryFixture) {
    let input = policy(RepoSelection::RepoLevel(vec![
        "api".to_owned(),
        "web".to_owned(),
        "api".to_owned(),
    ]));

    in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect("create should succeed");

    assert_eq!(
        write_paths(&in_memory.api, &Method::POST),
        vec![configs_path("api"), configs_path("web")]
    );
}

#[rstest]
#[tokio::test]
async fn repo_level_create_writes_each_repo_in_order(in_memory: InMemoryFixture) {
    let input = policy(RepoSelection::repos(["web", "api", "web"]));

    in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect("create should succeed");

    assert_eq!(
        write_paths(&in_memory.api, &Method::POST),
        vec![configs_path("web"), configs_path("api")]
    );
    let stored = in_memory.api.policy_driven_pr_entries("octo");
    assert_eq!(
        stored.keys().cloned().collect::<Vec<_>>(),
        vec!["octo/api".to_owned(), "octo/web".to_owned()]
    );
}

#[rstest]
#[tokio::test]
async fn repo_level_policy_round_trips(in_memory: InMemoryFixture) {
    let input = policy(RepoSelection::repos(["api", "web"]));

    in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect("create should succeed");
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(read_back, input);
    assert!(read_back.use_repo_level_config());
}

#[rstest]
#[tokio::test]
async fn policy_without_controls_round_trips(in_memory: InMemoryFixture) {
    let input = PolicyDrivenPrPolicy {
        owner: "octo".to_owned(),
        auto_remediation_options: AutoRemediationOptions {
            create_pr: true,
            create_github_advanced_security_alert: true,
            actions_to_exempt_while_pinning: vec!["actions/checkout".to_owned()],
            ..AutoRemediationOptions::default()
        },
        selection: RepoSelection::repos(["api"]),
    };

    in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect("create should succeed");
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(read_back, input);
}

#[rstest]
#[tokio::test]
async fn issue_only_policy_without_controls_reads_back_as_pr(in_memory: InMemoryFixture) {
    let input = PolicyDrivenPrPolicy {
        owner: "octo".to_owned(),
        auto_remediation_options: AutoRemediationOptions {
            create_issue: true,
            ..AutoRemediationOptions::default()
        },
        selection: RepoSelection::repos(["api"]),
    };
    let normalised = PolicyDrivenPrPolicy {
        auto_remediation_options: AutoRemediationOptions {
            create_pr: true,
            ..AutoRemediationOptions::default()
        },
        ..input.clone()
    };

    in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect("create should succeed");
    let first_read = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");
    in_memory
        .client
        .create_policy_driven_pr_policy(&first_read)
        .await
        .expect("rewrite should succeed");
    let second_read = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(first_read, normalised);
    assert_eq!(second_read, normalised);
}

#[rstest]
#[tokio::test]
async fn org_level_policy_round_trips_through_all_target(in_memory: InMemoryFixture) {
    let input = policy(RepoSelection::from_selected_repos(&["*"]));

    in_memory
        .client
        .create_policy_driven_pr_policy(&input)
        .await
        .expect("create should succeed");
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(write_paths(&in_memory.api, &Method::POST), vec![configs_path("[all]")]);
    assert_eq!(read_back, input);
    assert_eq!(read_back.selected_repos(), vec!["*".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn read_of_unconfigured_owner_is_empty(in_memory: InMemoryFixture) {
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(read_back, PolicyDrivenPrPolicy::empty("octo"));
}

#[rstest]
#[tokio::test]
async fn org_entry_wins_over_stale_repo_entries(in_memory: InMemoryFixture) {
    in_memory.api.seed_policy_driven_pr_entry(
        "octo",
        json!({
            "full_name": "octo/legacy",
            "config": { "control_checks": { "SecureDockerFile": { "trigger_issue": true } } }
        }),
    );

    in_memory
        .client
        .create_policy_driven_pr_policy(&policy(RepoSelection::OrgLevel))
        .await
        .expect("create should succeed");
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(read_back, policy(RepoSelection::OrgLevel));
}

#[rstest]
#[tokio::test]
async fn update_deletes_removed_repos_before_writing(in_memory: InMemoryFixture) {
    in_memory
        .client
        .create_policy_driven_pr_policy(&policy(RepoSelection::repos(["api", "web"])))
        .await
        .expect("create should succeed");
    in_memory.api.clear_requests();

    in_memory
        .client
        .update_policy_driven_pr_policy(&policy(RepoSelection::repos(["api"])), &["web".to_owned()])
        .await
        .expect("update should succeed");

    let requests = in_memory.api.requests();
    let order: Vec<(Method, String)> = requests
        .into_iter()
        .map(|request| (request.method, request.path))
        .collect();
    assert_eq!(
        order,
        vec![
            (Method::DELETE, configs_path("web")),
            (Method::POST, configs_path("api")),
        ]
    );
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");
    assert_eq!(read_back.selected_repos(), vec!["api".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn failed_delete_aborts_update_before_any_write(in_memory: InMemoryFixture) {
    in_memory.api.fail_on(Method::DELETE, "/web/", 500);

    let error = in_memory
        .client
        .update_policy_driven_pr_policy(&policy(RepoSelection::repos(["api"])), &["web".to_owned()])
        .await
        .expect_err("update should fail");

    assert_eq!(error.status(), Some(500));
    assert!(write_paths(&in_memory.api, &Method::POST).is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_write_stops_fan_out_and_keeps_earlier_repos(in_memory: InMemoryFixture) {
    in_memory.api.fail_on(Method::POST, "/beta/", 503);

    let error = in_memory
        .client
        .create_policy_driven_pr_policy(&policy(RepoSelection::repos(["alpha", "beta", "gamma"])))
        .await
        .expect_err("create should fail");

    assert_eq!(error.status(), Some(503));
    assert_eq!(
        write_paths(&in_memory.api, &Method::POST),
        vec![configs_path("alpha"), configs_path("beta")]
    );
    let stored = in_memory.api.policy_driven_pr_entries("octo");
    assert!(stored.contains_key("octo/alpha"));
    assert!(!stored.contains_key("octo/gamma"));
}

#[tokio::test]
async fn delete_maps_star_to_all_target() {
    let mut transport = MockTransport::new();
    let mut sequence = Sequence::new();
    for target in ["api", "[all]"] {
        let expected = format!("http://stepsecurity.test/v1/github/octo/{target}{CONFIGS_SUFFIX}");
        transport
            .expect_execute()
            .withf(move |request| request.method == Method::DELETE && request.url == expected)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(Vec::new()));
    }
    let config = ClientConfig::new(
        "http://stepsecurity.test",
        ApiKey::new("key").expect("key should be valid"),
        "acme",
    )
    .expect("config should be valid");
    let client = StepSecurityClient::new(config, transport);

    client
        .delete_policy_driven_pr_policy("octo", &["api".to_owned(), "*".to_owned()])
        .await
        .expect("delete should succeed");
}

#[rstest]
#[tokio::test]
async fn delete_then_read_is_empty(in_memory: InMemoryFixture) {
    in_memory
        .client
        .create_policy_driven_pr_policy(&policy(RepoSelection::repos(["api", "web"])))
        .await
        .expect("create should succeed");

    in_memory
        .client
        .delete_policy_driven_pr_policy("octo", &["api".to_owned(), "web".to_owned()])
        .await
        .expect("delete should succeed");
    let read_back = in_memory
        .client
        .get_policy_driven_pr_policy("octo")
        .await
        .expect("read should succeed");

    assert_eq!(read_back, PolicyDrivenPrPolicy::empty("octo"));
}

#[test]
fn from_selected_repos_treats_star_anywhere_as_org_level() {
    assert_eq!(RepoSelection::from_selected_repos(&["api", "*"]), RepoSelection::OrgLevel);
    assert_eq!(
        RepoSelection::from_selected_repos(&["api", "web", "api"]),
        RepoSelection::RepoLevel(vec!["api".to_owned(), "web".to_owned()])
    );
}
