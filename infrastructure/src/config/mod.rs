//! Application configuration, loaded from environment variables over
//! built-in defaults.
//!
//! The global `runbook_mode` selects mock everything; per-integration
//! override keys (`servicenow_mode`, `datadog_mode`, ...) cut individual
//! categories over to a live vendor while the rest stay mocked.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use runbook_domain::RunbookError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Global mode: "mock" or "live".
    pub runbook_mode: String,

    // Mock behavior
    /// Which fixture bundle the mock providers and mock ML engine serve.
    pub mock_scenario: String,
    /// Simulate per-provider API latency.
    pub mock_delay_enabled: bool,

    // ML engine
    pub ml_engine_provider: String,
    pub anthropic_api_key: String,
    pub ml_model: String,

    // ServiceNow
    pub servicenow_mode: String,
    pub servicenow_instance: String,
    pub servicenow_username: String,
    pub servicenow_password: String,

    // Datadog
    pub datadog_mode: String,
    pub datadog_api_key: String,
    pub datadog_app_key: String,

    // PagerDuty
    pub pagerduty_mode: String,
    pub pagerduty_api_key: String,

    // AWS
    pub aws_mode: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,

    // Jira
    pub jira_mode: String,
    pub jira_url: String,
    pub jira_username: String,
    pub jira_api_token: String,

    // Slack
    pub slack_mode: String,
    pub slack_bot_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runbook_mode: "mock".to_string(),
            mock_scenario: "high_cpu".to_string(),
            mock_delay_enabled: true,
            ml_engine_provider: "anthropic".to_string(),
            anthropic_api_key: String::new(),
            ml_model: "claude-sonnet-4-5".to_string(),
            servicenow_mode: String::new(),
            servicenow_instance: String::new(),
            servicenow_username: String::new(),
            servicenow_password: String::new(),
            datadog_mode: String::new(),
            datadog_api_key: String::new(),
            datadog_app_key: String::new(),
            pagerduty_mode: String::new(),
            pagerduty_api_key: String::new(),
            aws_mode: String::new(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            aws_region: "us-east-1".to_string(),
            jira_mode: String::new(),
            jira_url: String::new(),
            jira_username: String::new(),
            jira_api_token: String::new(),
            slack_mode: String::new(),
            slack_bot_token: String::new(),
        }
    }
}

impl Settings {
    /// Load settings: environment variables merged over defaults
    /// (`RUNBOOK_MODE`, `MOCK_SCENARIO`, `DATADOG_MODE`, ...).
    pub fn load() -> Result<Settings, RunbookError> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Env::raw())
            .extract()
            .map_err(|e| RunbookError::Configuration(e.to_string()))
    }

    /// Effective mode for a per-integration key. The override wins when set;
    /// otherwise the global mode applies.
    pub fn integration_mode(&self, integration: &str) -> &str {
        let override_mode = match integration {
            "servicenow" => self.servicenow_mode.as_str(),
            "jira" => self.jira_mode.as_str(),
            "datadog" => self.datadog_mode.as_str(),
            "pagerduty" => self.pagerduty_mode.as_str(),
            "aws" => self.aws_mode.as_str(),
            "slack" => self.slack_mode.as_str(),
            _ => "",
        };
        if override_mode.is_empty() {
            &self.runbook_mode
        } else {
            override_mode
        }
    }

    /// The named fixture bundles the mock layer ships.
    pub fn available_scenarios() -> &'static [&'static str] {
        &[
            "high_cpu",
            "database_connection",
            "deployment_failure",
            "network_latency",
        ]
    }
}
