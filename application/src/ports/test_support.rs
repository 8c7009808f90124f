//! Shared stub providers for use-case tests.
//!
//! One stub backs all five capability contracts; per-category failure
//! injection and a pop-per-call alert sequence cover the failure-isolation
//! and verification-retry scenarios.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use runbook_domain::incident::entities::Incident;
use runbook_domain::incident::value_objects::{
    Classification, DiagnosticResult, RecommendationSet,
};
use runbook_domain::incident::entities::Finding;
use runbook_domain::integration::records::{
    Alert, AlertRequest, Channel, ChangeRecord, ChatMessage, CreateTicketRequest, HostInfo,
    KbArticle, LogEntry, LogQuery, MetricQuery, MetricTimeSeries, OnCallInfo, PagerIncident,
    ProcessInfo,
};
use runbook_domain::RunbookError;

use super::integrations::{
    AlertingProvider, CommunicationProvider, ComputeProvider, MonitoringProvider,
    TicketingProvider,
};
use super::ml_engine::MlEngine;
use super::registry::ProviderRegistry;

#[derive(Default)]
pub struct StubState {
    /// Per-call alert batches; once drained, `default_alerts` is served.
    pub alert_sequence: Mutex<VecDeque<Vec<Alert>>>,
    pub default_alerts: Mutex<Vec<Alert>>,
    pub logs: Mutex<Vec<LogEntry>>,
    pub changes: Mutex<Vec<ChangeRecord>>,
    pub processes: Mutex<Vec<ProcessInfo>>,
    pub pager_incidents: Mutex<Vec<PagerIncident>>,
    /// Categories whose every call fails with an integration error.
    pub failing: Mutex<HashSet<String>>,
    pub sent_messages: Mutex<Vec<(String, String)>>,
    pub restarts: Mutex<Vec<Map<String, Value>>>,
    pub reset_count: Mutex<usize>,
}

#[derive(Clone, Default)]
pub struct StubRegistry {
    pub state: Arc<StubState>,
}

impl StubRegistry {
    pub fn alert(id: &str, status: &str) -> Alert {
        serde_json::from_value(json!({
            "id": id,
            "name": "cpu.utilization.high",
            "host": "prod-web-03",
            "value": 94.2,
            "threshold": 90.0,
            "status": status,
            "severity": "high",
        }))
        .unwrap()
    }

    pub fn with_alerts(self, alerts: Vec<Alert>) -> Self {
        *self.state.default_alerts.lock().unwrap() = alerts;
        self
    }

    pub fn with_alert_sequence(self, batches: Vec<Vec<Alert>>) -> Self {
        *self.state.alert_sequence.lock().unwrap() = batches.into();
        self
    }

    pub fn with_logs(self, logs: Vec<LogEntry>) -> Self {
        *self.state.logs.lock().unwrap() = logs;
        self
    }

    pub fn with_changes(self, changes: Vec<ChangeRecord>) -> Self {
        *self.state.changes.lock().unwrap() = changes;
        self
    }

    pub fn with_processes(self, processes: Vec<ProcessInfo>) -> Self {
        *self.state.processes.lock().unwrap() = processes;
        self
    }

    pub fn with_pager_incidents(self, incidents: Vec<PagerIncident>) -> Self {
        *self.state.pager_incidents.lock().unwrap() = incidents;
        self
    }

    pub fn failing(self, category: &str) -> Self {
        self.state.failing.lock().unwrap().insert(category.to_string());
        self
    }

    /// Canned evidence for gather_context tests: one alert, two logs, one
    /// change, two processes, one pager incident.
    pub fn with_default_evidence(self) -> Self {
        self.with_alerts(vec![Self::alert("al-1", "triggered")])
            .with_logs(vec![
                serde_json::from_value(json!({
                    "timestamp": "2026-01-15T10:28:00Z",
                    "level": "error",
                    "host": "prod-web-03",
                    "message": "OOM killer invoked",
                }))
                .unwrap(),
                serde_json::from_value(json!({
                    "timestamp": "2026-01-15T10:29:00Z",
                    "level": "warn",
                    "host": "prod-web-03",
                    "message": "GC pause exceeded 5000ms",
                }))
                .unwrap(),
            ])
            .with_changes(vec![serde_json::from_value(json!({
                "id": "chg-1",
                "number": "CHG0004567",
                "description": "Deploy web-app v2.14.3",
            }))
            .unwrap()])
            .with_processes(vec![
                serde_json::from_value(json!({
                    "pid": 12345,
                    "name": "java",
                    "cpu_percent": 89.3,
                    "memory_percent": 61.0,
                }))
                .unwrap(),
                serde_json::from_value(json!({
                    "pid": 2201,
                    "name": "nginx",
                    "cpu_percent": 3.1,
                }))
                .unwrap(),
            ])
            .with_pager_incidents(vec![serde_json::from_value(json!({
                "id": "pd-1",
                "title": "High CPU on prod-web-03",
                "status": "triggered",
            }))
            .unwrap()])
    }

    fn provider(&self, category: &'static str) -> Arc<StubProvider> {
        Arc::new(StubProvider {
            state: Arc::clone(&self.state),
            category,
        })
    }
}

impl ProviderRegistry for StubRegistry {
    fn ticketing(&self) -> Result<Arc<dyn TicketingProvider>, RunbookError> {
        Ok(self.provider("ticketing"))
    }

    fn monitoring(&self) -> Result<Arc<dyn MonitoringProvider>, RunbookError> {
        Ok(self.provider("monitoring"))
    }

    fn alerting(&self) -> Result<Arc<dyn AlertingProvider>, RunbookError> {
        Ok(self.provider("alerting"))
    }

    fn compute(&self) -> Result<Arc<dyn ComputeProvider>, RunbookError> {
        Ok(self.provider("compute"))
    }

    fn communication(&self) -> Result<Arc<dyn CommunicationProvider>, RunbookError> {
        Ok(self.provider("communication"))
    }

    fn reset(&self) {
        *self.state.reset_count.lock().unwrap() += 1;
    }
}

pub struct StubProvider {
    state: Arc<StubState>,
    category: &'static str,
}

impl StubProvider {
    fn check(&self) -> Result<(), RunbookError> {
        if self.state.failing.lock().unwrap().contains(self.category) {
            return Err(RunbookError::integration(self.category, "injected failure"));
        }
        Ok(())
    }

    fn stub_incident(&self, id: &str) -> Incident {
        let mut incident = Incident::from_report("stub ticket");
        incident.id = id.to_string();
        incident
    }
}

#[async_trait]
impl TicketingProvider for StubProvider {
    async fn get_incident(&self, incident_id: &str) -> Result<Incident, RunbookError> {
        self.check()?;
        Ok(self.stub_incident(incident_id))
    }

    async fn create_incident(&self, request: CreateTicketRequest) -> Result<Incident, RunbookError> {
        self.check()?;
        Ok(Incident::from_report(request.short_description))
    }

    async fn update_incident(
        &self,
        incident_id: &str,
        _updates: Map<String, Value>,
    ) -> Result<Incident, RunbookError> {
        self.check()?;
        Ok(self.stub_incident(incident_id))
    }

    async fn get_recent_changes(&self, _timeframe: &str) -> Result<Vec<ChangeRecord>, RunbookError> {
        self.check()?;
        Ok(self.state.changes.lock().unwrap().clone())
    }

    async fn add_work_note(&self, _incident_id: &str, _note: &str) -> Result<(), RunbookError> {
        self.check()
    }

    async fn search_knowledge_base(&self, _query: &str) -> Result<Vec<KbArticle>, RunbookError> {
        self.check()?;
        Ok(Vec::new())
    }
}

#[async_trait]
impl MonitoringProvider for StubProvider {
    async fn get_current_alerts(
        &self,
        _filters: Map<String, Value>,
    ) -> Result<Vec<Alert>, RunbookError> {
        self.check()?;
        if let Some(batch) = self.state.alert_sequence.lock().unwrap().pop_front() {
            return Ok(batch);
        }
        Ok(self.state.default_alerts.lock().unwrap().clone())
    }

    async fn get_metrics(&self, query: MetricQuery) -> Result<MetricTimeSeries, RunbookError> {
        self.check()?;
        Ok(MetricTimeSeries {
            metric_name: query.metric_name,
            host: query.host,
            points: Vec::new(),
            unit: None,
        })
    }

    async fn get_logs(&self, _query: LogQuery) -> Result<Vec<LogEntry>, RunbookError> {
        self.check()?;
        Ok(self.state.logs.lock().unwrap().clone())
    }

    async fn get_host_info(&self, hostname: &str) -> Result<HostInfo, RunbookError> {
        self.check()?;
        Ok(stub_host(hostname))
    }

    async fn get_top_processes(
        &self,
        _hostname: &str,
        limit: usize,
    ) -> Result<Vec<ProcessInfo>, RunbookError> {
        self.check()?;
        let processes = self.state.processes.lock().unwrap();
        Ok(processes.iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl AlertingProvider for StubProvider {
    async fn get_active_incidents(&self) -> Result<Vec<PagerIncident>, RunbookError> {
        self.check()?;
        Ok(self.state.pager_incidents.lock().unwrap().clone())
    }

    async fn get_on_call(&self, schedule: &str) -> Result<OnCallInfo, RunbookError> {
        self.check()?;
        Ok(OnCallInfo {
            user: "sam".to_string(),
            schedule: schedule.to_string(),
            start: None,
            end: None,
            escalation_level: 1,
        })
    }

    async fn trigger_alert(&self, _request: AlertRequest) -> Result<(), RunbookError> {
        self.check()
    }

    async fn acknowledge_alert(&self, _alert_id: &str) -> Result<(), RunbookError> {
        self.check()
    }
}

#[async_trait]
impl ComputeProvider for StubProvider {
    async fn get_host_info(&self, hostname: &str) -> Result<HostInfo, RunbookError> {
        self.check()?;
        Ok(stub_host(hostname))
    }

    async fn get_top_processes(
        &self,
        _hostname: &str,
        limit: usize,
    ) -> Result<Vec<ProcessInfo>, RunbookError> {
        self.check()?;
        let processes = self.state.processes.lock().unwrap();
        Ok(processes.iter().take(limit).cloned().collect())
    }

    async fn restart_service(
        &self,
        hostname: &str,
        service: &str,
        options: Map<String, Value>,
    ) -> Result<Map<String, Value>, RunbookError> {
        self.check()?;
        let result: Map<String, Value> = json!({
            "hostname": hostname,
            "service": service,
            "action": "restart",
            "status": "success",
            "options": options,
        })
        .as_object()
        .cloned()
        .unwrap();
        self.state.restarts.lock().unwrap().push(result.clone());
        Ok(result)
    }
}

#[async_trait]
impl CommunicationProvider for StubProvider {
    async fn send_message(&self, channel: &str, message: &str) -> Result<(), RunbookError> {
        self.check()?;
        self.state
            .sent_messages
            .lock()
            .unwrap()
            .push((channel.to_string(), message.to_string()));
        Ok(())
    }

    async fn create_channel(&self, name: &str, purpose: &str) -> Result<Channel, RunbookError> {
        self.check()?;
        Ok(Channel {
            id: format!("C-{name}"),
            name: name.to_string(),
            purpose: purpose.to_string(),
            created_at: None,
        })
    }

    async fn get_recent_messages(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RunbookError> {
        self.check()?;
        let messages = self.state.sent_messages.lock().unwrap();
        Ok(messages
            .iter()
            .filter(|(c, _)| c == channel)
            .rev()
            .take(limit)
            .map(|(c, text)| ChatMessage {
                id: "msg-stub".to_string(),
                channel: c.clone(),
                text: text.clone(),
                author: "stub".to_string(),
                timestamp: None,
            })
            .collect())
    }
}

fn stub_host(hostname: &str) -> HostInfo {
    HostInfo {
        hostname: if hostname.is_empty() {
            "prod-web-03".to_string()
        } else {
            hostname.to_string()
        },
        instance_id: Some("i-0abc123".to_string()),
        instance_type: Some("m5.xlarge".to_string()),
        state: "running".to_string(),
        ip_address: None,
        region: Some("us-east-1".to_string()),
        tags: Default::default(),
    }
}

/// Canned ML engine for use-case tests.
#[derive(Default)]
pub struct StubMlEngine {
    pub classification: Option<Classification>,
    pub diagnosis: Option<DiagnosticResult>,
    pub recommendations: Option<RecommendationSet>,
    pub summary: Option<String>,
    pub fail_classify: bool,
    pub fail_diagnose: bool,
}

impl StubMlEngine {
    pub fn with_recommendations(mut self, set: RecommendationSet) -> Self {
        self.recommendations = Some(set);
        self
    }
}

#[async_trait]
impl MlEngine for StubMlEngine {
    async fn classify(&self, _problem_description: &str) -> Result<Classification, RunbookError> {
        if self.fail_classify {
            return Err(RunbookError::MlEngine("classify transport error".to_string()));
        }
        Ok(self.classification.clone().unwrap_or_else(|| {
            serde_json::from_value(json!({
                "category": "compute",
                "severity": "high",
                "confidence": 0.94,
                "reasoning": "CPU saturation on a production web host",
            }))
            .unwrap()
        }))
    }

    async fn diagnose(
        &self,
        _problem_description: &str,
        _findings: &[Finding],
    ) -> Result<DiagnosticResult, RunbookError> {
        if self.fail_diagnose {
            return Err(RunbookError::MlEngine("diagnose transport error".to_string()));
        }
        Ok(self.diagnosis.clone().unwrap_or_else(|| {
            serde_json::from_value(json!({
                "root_cause": "Memory leak in v2.14.3",
                "evidence_summary": "GC pauses and OOM kills after deploy",
                "confidence": 0.91,
                "contributing_factors": ["recent deploy"],
                "affected_components": ["prod-web-03"],
            }))
            .unwrap()
        }))
    }

    async fn recommend(
        &self,
        _problem_description: &str,
        _diagnosis: &DiagnosticResult,
        _findings: &[Finding],
    ) -> Result<RecommendationSet, RunbookError> {
        Ok(self.recommendations.clone().unwrap_or_default())
    }

    async fn summarize(&self, _incident: &Incident) -> Result<String, RunbookError> {
        Ok(self
            .summary
            .clone()
            .unwrap_or_else(|| "Stub incident summary.".to_string()))
    }
}
