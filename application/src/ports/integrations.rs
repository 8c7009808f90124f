//! Provider capability contracts.
//!
//! Five capability families, each an async trait returning typed records.
//! Every method is a suspension point and may fail with
//! [`RunbookError::Integration`]. Implementations (mock or live vendor
//! clients) live in the infrastructure layer.

use async_trait::async_trait;
use serde_json::{Map, Value};

use runbook_domain::RunbookError;
use runbook_domain::incident::entities::Incident;
use runbook_domain::integration::records::{
    Alert, AlertRequest, Channel, ChangeRecord, ChatMessage, CreateTicketRequest, HostInfo,
    KbArticle, LogEntry, LogQuery, MetricQuery, MetricTimeSeries, OnCallInfo, PagerIncident,
    ProcessInfo,
};

/// Incident/ticket management systems (ServiceNow, Jira).
#[async_trait]
pub trait TicketingProvider: Send + Sync {
    async fn get_incident(&self, incident_id: &str) -> Result<Incident, RunbookError>;

    async fn create_incident(&self, request: CreateTicketRequest) -> Result<Incident, RunbookError>;

    async fn update_incident(
        &self,
        incident_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Incident, RunbookError>;

    /// Change records closed within the given timeframe (e.g. "4h").
    async fn get_recent_changes(&self, timeframe: &str) -> Result<Vec<ChangeRecord>, RunbookError>;

    async fn add_work_note(&self, incident_id: &str, note: &str) -> Result<(), RunbookError>;

    async fn search_knowledge_base(&self, query: &str) -> Result<Vec<KbArticle>, RunbookError>;
}

/// Monitoring/observability systems (Datadog, CloudWatch).
#[async_trait]
pub trait MonitoringProvider: Send + Sync {
    async fn get_current_alerts(
        &self,
        filters: Map<String, Value>,
    ) -> Result<Vec<Alert>, RunbookError>;

    async fn get_metrics(&self, query: MetricQuery) -> Result<MetricTimeSeries, RunbookError>;

    async fn get_logs(&self, query: LogQuery) -> Result<Vec<LogEntry>, RunbookError>;

    async fn get_host_info(&self, hostname: &str) -> Result<HostInfo, RunbookError>;

    async fn get_top_processes(
        &self,
        hostname: &str,
        limit: usize,
    ) -> Result<Vec<ProcessInfo>, RunbookError>;
}

impl std::fmt::Debug for dyn MonitoringProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dyn MonitoringProvider")
    }
}

/// Alerting/on-call systems (PagerDuty).
#[async_trait]
pub trait AlertingProvider: Send + Sync {
    async fn get_active_incidents(&self) -> Result<Vec<PagerIncident>, RunbookError>;

    async fn get_on_call(&self, schedule: &str) -> Result<OnCallInfo, RunbookError>;

    async fn trigger_alert(&self, request: AlertRequest) -> Result<(), RunbookError>;

    async fn acknowledge_alert(&self, alert_id: &str) -> Result<(), RunbookError>;
}

/// Compute/infrastructure systems (AWS EC2, SSH).
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    async fn get_host_info(&self, hostname: &str) -> Result<HostInfo, RunbookError>;

    async fn get_top_processes(
        &self,
        hostname: &str,
        limit: usize,
    ) -> Result<Vec<ProcessInfo>, RunbookError>;

    /// Restart a service on a host. `options` carries provider-specific
    /// extras (target version, config overrides).
    async fn restart_service(
        &self,
        hostname: &str,
        service: &str,
        options: Map<String, Value>,
    ) -> Result<Map<String, Value>, RunbookError>;
}

/// Communication/notification systems (Slack).
#[async_trait]
pub trait CommunicationProvider: Send + Sync {
    async fn send_message(&self, channel: &str, message: &str) -> Result<(), RunbookError>;

    async fn create_channel(&self, name: &str, purpose: &str) -> Result<Channel, RunbookError>;

    async fn get_recent_messages(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RunbookError>;
}
