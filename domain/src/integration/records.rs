//! Typed records exchanged with integration providers.
//!
//! These are the wire-level shapes the five capability contracts speak.
//! They all serialize with serde so runtime dispatch can coerce them into
//! normalized result mappings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::incident::enums::{ProblemCategory, Severity};

/// A monitoring alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub name: String,
    pub host: Option<String>,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    /// "triggered" while firing; anything else counts as cleared.
    #[serde(default = "default_triggered")]
    pub status: String,
    #[serde(default)]
    pub severity: Severity,
    pub triggered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == "triggered"
    }
}

fn default_triggered() -> String {
    "triggered".to_string()
}

/// Query parameters for a metric time series.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricQuery {
    pub metric_name: String,
    pub host: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricTimeSeries {
    pub metric_name: String,
    pub host: Option<String>,
    #[serde(default)]
    pub points: Vec<MetricDataPoint>,
    pub unit: Option<String>,
}

/// Query parameters for log search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogQuery {
    pub query: String,
    pub host: Option<String>,
    pub service: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default = "default_log_limit")]
    pub limit: usize,
}

impl LogQuery {
    pub fn all() -> Self {
        Self {
            query: "*".to_string(),
            host: None,
            service: None,
            start: None,
            end: None,
            limit: default_log_limit(),
        }
    }
}

fn default_log_limit() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_info")]
    pub level: String,
    pub host: Option<String>,
    pub service: Option<String>,
    pub message: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

fn default_info() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub instance_id: Option<String>,
    pub instance_type: Option<String>,
    #[serde(default = "default_running")]
    pub state: String,
    pub ip_address: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

fn default_running() -> String {
    "running".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub memory_percent: f64,
    pub user: Option<String>,
    pub command: Option<String>,
}

/// A change record from the ticketing system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: String,
    pub number: String,
    pub description: String,
    #[serde(default = "default_closed")]
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub requested_by: Option<String>,
    pub category: Option<String>,
}

fn default_closed() -> String {
    "closed".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    #[serde(default)]
    pub relevance_score: f64,
}

/// An incident as tracked by the alerting/on-call system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerIncident {
    pub id: String,
    pub title: String,
    #[serde(default = "default_triggered")]
    pub status: String,
    #[serde(default = "default_high")]
    pub urgency: String,
    pub service: Option<String>,
    pub assigned_to: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

fn default_high() -> String {
    "high".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnCallInfo {
    pub user: String,
    pub schedule: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    #[serde(default = "default_escalation")]
    pub escalation_level: u32,
}

fn default_escalation() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    pub service: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub channel: String,
    pub text: String,
    pub author: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Request to open a ticket in the ticketing system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: ProblemCategory,
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_active_state_follows_status() {
        let alert: Alert = serde_json::from_str(
            r#"{"id": "al-1", "name": "cpu.high", "host": "prod-web-03"}"#,
        )
        .unwrap();
        assert!(alert.is_active());

        let cleared: Alert = serde_json::from_str(
            r#"{"id": "al-2", "name": "cpu.high", "status": "resolved"}"#,
        )
        .unwrap();
        assert!(!cleared.is_active());
    }

    #[test]
    fn log_query_all_matches_everything() {
        let q = LogQuery::all();
        assert_eq!(q.query, "*");
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn records_serialize_for_coercion() {
        let host = HostInfo {
            hostname: "prod-web-03".to_string(),
            instance_id: Some("i-0abc".to_string()),
            instance_type: None,
            state: "running".to_string(),
            ip_address: None,
            region: Some("us-east-1".to_string()),
            tags: HashMap::new(),
        };
        let value = serde_json::to_value(&host).unwrap();
        assert_eq!(value["hostname"], "prod-web-03");
        assert_eq!(value["state"], "running");
    }
}
