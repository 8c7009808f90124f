//! Mock AWS provider - compute capability over scenario fixtures.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;

use runbook_application::ports::integrations::ComputeProvider;
use runbook_domain::integration::records::{HostInfo, ProcessInfo};
use runbook_domain::RunbookError;

use crate::config::Settings;

use super::{parse_fixture, MockCore};

pub struct MockAws {
    core: MockCore,
    restarted: Mutex<Vec<Map<String, Value>>>,
}

impl MockAws {
    pub fn new(settings: &Settings) -> Self {
        Self {
            core: MockCore::new(settings, "aws"),
            restarted: Mutex::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn restart_count(&self) -> usize {
        self.restarted.lock().unwrap().len()
    }
}

#[async_trait]
impl ComputeProvider for MockAws {
    /// An empty hostname picks the scenario's representative host.
    async fn get_host_info(&self, hostname: &str) -> Result<HostInfo, RunbookError> {
        self.core.simulate_delay().await;
        let mut data = self.core.object("instance");
        data.entry("hostname".to_string())
            .or_insert_with(|| Value::String(hostname.to_string()));
        parse_fixture("aws", Value::Object(data))
    }

    async fn get_top_processes(
        &self,
        _hostname: &str,
        limit: usize,
    ) -> Result<Vec<ProcessInfo>, RunbookError> {
        self.core.simulate_delay().await;
        let processes: Vec<ProcessInfo> =
            parse_fixture("aws", Value::Array(self.core.list("top_processes")))?;
        Ok(processes.into_iter().take(limit).collect())
    }

    async fn restart_service(
        &self,
        hostname: &str,
        service: &str,
        _options: Map<String, Value>,
    ) -> Result<Map<String, Value>, RunbookError> {
        self.core.simulate_delay().await;
        let hostname = if hostname.is_empty() { "unknown" } else { hostname };
        let result: Map<String, Value> = serde_json::json!({
            "hostname": hostname,
            "service": service,
            "action": "restart",
            "status": "success",
            "message": format!("Service '{service}' on {hostname} restarted successfully (mock)."),
        })
        .as_object()
        .cloned()
        .unwrap_or_default();
        self.restarted.lock().unwrap().push(result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockAws {
        MockAws::new(&Settings {
            mock_delay_enabled: false,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn empty_hostname_resolves_to_representative_host() {
        let host = provider().get_host_info("").await.unwrap();
        assert_eq!(host.hostname, "prod-web-03");
        assert_eq!(host.state, "running");
    }

    #[tokio::test]
    async fn top_processes_respect_the_limit() {
        let processes = provider().get_top_processes("prod-web-03", 2).await.unwrap();
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].name, "java");
    }

    #[tokio::test]
    async fn restart_service_records_the_restart() {
        let provider = provider();
        let result = provider
            .restart_service("prod-web-03", "java", Map::new())
            .await
            .unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["service"], "java");
        assert_eq!(provider.restart_count(), 1);
    }
}
