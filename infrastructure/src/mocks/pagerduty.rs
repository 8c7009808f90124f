//! Mock PagerDuty provider - alerting capability over scenario fixtures.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use runbook_application::ports::integrations::AlertingProvider;
use runbook_domain::integration::records::{AlertRequest, OnCallInfo, PagerIncident};
use runbook_domain::RunbookError;

use crate::config::Settings;

use super::{parse_fixture, MockCore};

pub struct MockPagerDuty {
    core: MockCore,
    acknowledged: Mutex<HashSet<String>>,
}

impl MockPagerDuty {
    pub fn new(settings: &Settings) -> Self {
        Self {
            core: MockCore::new(settings, "pagerduty"),
            acknowledged: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl AlertingProvider for MockPagerDuty {
    async fn get_active_incidents(&self) -> Result<Vec<PagerIncident>, RunbookError> {
        self.core.simulate_delay().await;
        let mut incidents: Vec<PagerIncident> =
            parse_fixture("pagerduty", serde_json::Value::Array(self.core.list("incidents")))?;
        let acknowledged = self.acknowledged.lock().unwrap();
        for incident in &mut incidents {
            if acknowledged.contains(&incident.id) {
                incident.status = "acknowledged".to_string();
            }
        }
        Ok(incidents)
    }

    async fn get_on_call(&self, schedule: &str) -> Result<OnCallInfo, RunbookError> {
        self.core.simulate_delay().await;
        let mut data = self.core.object("on_call");
        data.entry("user".to_string())
            .or_insert_with(|| serde_json::Value::String("Unknown".to_string()));
        data.entry("schedule".to_string())
            .or_insert_with(|| serde_json::Value::String(schedule.to_string()));
        parse_fixture("pagerduty", serde_json::Value::Object(data))
    }

    async fn trigger_alert(&self, _request: AlertRequest) -> Result<(), RunbookError> {
        self.core.simulate_delay().await;
        // Triggering is a no-op in mock mode
        Ok(())
    }

    async fn acknowledge_alert(&self, alert_id: &str) -> Result<(), RunbookError> {
        self.core.simulate_delay().await;
        self.acknowledged.lock().unwrap().insert(alert_id.to_string());
        Ok(())
    }
}
