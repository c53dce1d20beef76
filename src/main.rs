//! StepSecurity CLI entrypoint for inspecting policy-driven PR policies.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use stepsecurity::{ApiError, PolicyDrivenPrPolicy, StepSecurityClient, StepSecurityConfig};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ApiError> {
    let config = load_config()?;
    let owner = config.require_owner()?;

    let client = StepSecurityClient::from_config(config.client_config()?)?;
    let policy = client.get_policy_driven_pr_policy(owner).await?;

    write_policy(&policy)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ApiError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<StepSecurityConfig, ApiError> {
    StepSecurityConfig::load().map_err(|error| ApiError::Configuration {
        message: error.to_string(),
    })
}

fn write_policy(policy: &PolicyDrivenPrPolicy) -> Result<(), ApiError> {
    let rendered = serde_json::to_string_pretty(policy).map_err(|error| ApiError::Encode {
        operation: "policy-driven PR policy".to_owned(),
        message: error.to_string(),
    })?;

    writeln!(io::stdout().lock(), "{rendered}").map_err(|error| ApiError::Io {
        message: error.to_string(),
    })
}
