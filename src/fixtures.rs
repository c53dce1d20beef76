//! Shared `rstest` fixtures for unit tests that talk to a Wiremock server.

use rstest::fixture;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

use crate::api::{ApiKey, ClientConfig, StepSecurityClient};

/// A mock StepSecurity API and a client pointed at it.
///
/// The server is declared before the runtime so it is dropped, and its
/// expectations verified, while the runtime still exists.
pub(crate) struct WiremockFixture {
    pub(crate) server: MockServer,
    pub(crate) client: StepSecurityClient,
    runtime: Runtime,
}

impl WiremockFixture {
    pub(crate) fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub(crate) fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// JSON bodies of every received request, in arrival order.
    pub(crate) fn received_json(&self) -> Vec<serde_json::Value> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}

#[fixture]
pub(crate) fn wiremock_fixture() -> WiremockFixture {
    let runtime = Runtime::new().expect("runtime should start");
    let server = runtime.block_on(MockServer::start());
    let api_key = ApiKey::new("test-api-key").expect("API key should be valid");
    let config = ClientConfig::new(server.uri(), api_key, "acme").expect("config should be valid");
    let client = {
        let _guard = runtime.enter();
        StepSecurityClient::from_config(config).expect("client should build")
    };
    WiremockFixture {
        server,
        client,
        runtime,
    }
}
