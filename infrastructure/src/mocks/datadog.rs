//! Mock Datadog provider - monitoring capability over scenario fixtures.

use async_trait::async_trait;
use serde_json::{Map, Value};

use runbook_application::ports::integrations::MonitoringProvider;
use runbook_domain::integration::records::{
    Alert, HostInfo, LogEntry, LogQuery, MetricDataPoint, MetricQuery, MetricTimeSeries,
    ProcessInfo,
};
use runbook_domain::RunbookError;

use crate::config::Settings;

use super::{parse_fixture, MockCore};

pub struct MockDatadog {
    core: MockCore,
}

impl MockDatadog {
    pub fn new(settings: &Settings) -> Self {
        Self {
            core: MockCore::new(settings, "datadog"),
        }
    }
}

#[async_trait]
impl MonitoringProvider for MockDatadog {
    async fn get_current_alerts(
        &self,
        _filters: Map<String, Value>,
    ) -> Result<Vec<Alert>, RunbookError> {
        self.core.simulate_delay().await;
        parse_fixture("datadog", Value::Array(self.core.list("alerts")))
    }

    async fn get_metrics(&self, query: MetricQuery) -> Result<MetricTimeSeries, RunbookError> {
        self.core.simulate_delay().await;
        let metrics = self.core.object("metrics");

        // Exact metric name first; a missing key or an empty series falls
        // back to the first available series
        let series = metrics
            .get(&query.metric_name)
            .filter(|series| series.as_array().is_none_or(|points| !points.is_empty()))
            .or_else(|| metrics.values().next())
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        let points: Vec<MetricDataPoint> = parse_fixture("datadog", series)?;

        Ok(MetricTimeSeries {
            metric_name: query.metric_name,
            host: query.host,
            points,
            unit: None,
        })
    }

    async fn get_logs(&self, _query: LogQuery) -> Result<Vec<LogEntry>, RunbookError> {
        self.core.simulate_delay().await;
        parse_fixture("datadog", Value::Array(self.core.list("logs")))
    }

    async fn get_host_info(&self, hostname: &str) -> Result<HostInfo, RunbookError> {
        self.core.simulate_delay().await;
        let mut data = self.core.object("host_info");
        data.entry("hostname".to_string())
            .or_insert_with(|| Value::String(hostname.to_string()));
        parse_fixture("datadog", Value::Object(data))
    }

    async fn get_top_processes(
        &self,
        _hostname: &str,
        _limit: usize,
    ) -> Result<Vec<ProcessInfo>, RunbookError> {
        self.core.simulate_delay().await;
        // The monitoring fixture carries no process data; compute does.
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockDatadog {
        MockDatadog::new(&Settings {
            mock_delay_enabled: false,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn serves_scenario_alerts() {
        let alerts = provider().get_current_alerts(Map::new()).await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| a.is_active()));
    }

    #[tokio::test]
    async fn unknown_metric_falls_back_to_first_series() {
        let query: MetricQuery = serde_json::from_value(serde_json::json!({
            "metric_name": "does.not.exist",
        }))
        .unwrap();
        let series = provider().get_metrics(query).await.unwrap();
        assert_eq!(series.metric_name, "does.not.exist");
        assert!(!series.points.is_empty());
    }

    #[tokio::test]
    async fn empty_series_falls_back_to_first_available() {
        let provider = MockDatadog::new(&Settings {
            mock_scenario: "deployment_failure".to_string(),
            mock_delay_enabled: false,
            ..Default::default()
        });
        // "rollback.count" exists in the fixture but holds no points
        let query: MetricQuery = serde_json::from_value(serde_json::json!({
            "metric_name": "rollback.count",
        }))
        .unwrap();
        let series = provider.get_metrics(query).await.unwrap();
        assert!(!series.points.is_empty());
    }

    #[tokio::test]
    async fn host_info_falls_back_to_requested_hostname() {
        let empty_scenario = MockDatadog::new(&Settings {
            mock_scenario: "missing".to_string(),
            mock_delay_enabled: false,
            ..Default::default()
        });
        let host = empty_scenario.get_host_info("some-host").await.unwrap();
        assert_eq!(host.hostname, "some-host");
    }
}
