//! Scenario-backed mock providers.
//!
//! Each mock reads its own section of the active scenario fixture and
//! optionally simulates vendor API latency. Stateful behavior (work notes,
//! acknowledgements, sent messages) lives in the provider instance and
//! resets with the registry cache.

pub mod aws;
pub mod datadog;
pub mod pagerduty;
pub mod scenarios;
pub mod servicenow;
pub mod slack;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

use runbook_domain::RunbookError;

use crate::config::Settings;

/// Deserialize a fixture value into a typed record, surfacing a fixture
/// mismatch as the provider's own integration error.
pub(crate) fn parse_fixture<T: DeserializeOwned>(
    provider: &str,
    value: Value,
) -> Result<T, RunbookError> {
    serde_json::from_value(value)
        .map_err(|e| RunbookError::integration(provider, format!("fixture parse error: {e}")))
}

/// Simulated API latency per vendor.
fn mock_delay(provider_key: &str) -> Duration {
    let millis = match provider_key {
        "servicenow" => 500,
        "datadog" => 300,
        "pagerduty" => 200,
        "aws" => 400,
        "slack" => 100,
        _ => 200,
    };
    Duration::from_millis(millis)
}

/// Shared plumbing for the mock providers: the provider's scenario section
/// and the latency toggle.
pub(crate) struct MockCore {
    section: Map<String, Value>,
    delay: Duration,
    delay_enabled: bool,
}

impl MockCore {
    pub(crate) fn new(settings: &Settings, provider_key: &str) -> Self {
        Self {
            section: scenarios::provider_section(&settings.mock_scenario, provider_key),
            delay: mock_delay(provider_key),
            delay_enabled: settings.mock_delay_enabled,
        }
    }

    pub(crate) async fn simulate_delay(&self) {
        if self.delay_enabled {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub(crate) fn get(&self, key: &str) -> Value {
        self.section.get(key).cloned().unwrap_or(Value::Null)
    }

    pub(crate) fn list(&self, key: &str) -> Vec<Value> {
        match self.section.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn object(&self, key: &str) -> Map<String, Value> {
        match self.section.get(key) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        }
    }
}
