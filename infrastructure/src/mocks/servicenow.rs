//! Mock ServiceNow provider - ticketing capability over scenario fixtures.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use runbook_application::ports::integrations::TicketingProvider;
use runbook_domain::incident::entities::Incident;
use runbook_domain::incident::enums::{IncidentStatus, ProblemCategory, Severity};
use runbook_domain::integration::records::{ChangeRecord, CreateTicketRequest, KbArticle};
use runbook_domain::{short_id, RunbookError};

use crate::config::Settings;

use super::{parse_fixture, MockCore};

pub struct MockServiceNow {
    core: MockCore,
    work_notes: Mutex<HashMap<String, Vec<String>>>,
}

impl MockServiceNow {
    pub fn new(settings: &Settings) -> Self {
        Self {
            core: MockCore::new(settings, "servicenow"),
            work_notes: Mutex::new(HashMap::new()),
        }
    }

    fn incident_from_fixture(&self, incident_id: &str) -> Incident {
        let data = self.core.object("incident");
        let field = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or("");

        let mut incident = Incident::from_report(field("description"));
        incident.id = if field("id").is_empty() {
            incident_id.to_string()
        } else {
            field("id").to_string()
        };
        if !field("short_description").is_empty() {
            incident.title = field("short_description").to_string();
        }
        incident.status = serde_json::from_value(data.get("status").cloned().unwrap_or_default())
            .unwrap_or(IncidentStatus::New);
        incident.severity = serde_json::from_value(data.get("severity").cloned().unwrap_or_default())
            .unwrap_or(Severity::Medium);
        incident.category = serde_json::from_value(data.get("category").cloned().unwrap_or_default())
            .unwrap_or(ProblemCategory::Unknown);
        incident
            .metadata
            .insert("source".to_string(), Value::String("servicenow".to_string()));
        incident.metadata.insert(
            "number".to_string(),
            data.get("number").cloned().unwrap_or(Value::String(String::new())),
        );
        incident
    }

    #[cfg(test)]
    pub fn work_note_count(&self, incident_id: &str) -> usize {
        self.work_notes
            .lock()
            .unwrap()
            .get(incident_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl TicketingProvider for MockServiceNow {
    async fn get_incident(&self, incident_id: &str) -> Result<Incident, RunbookError> {
        self.core.simulate_delay().await;
        Ok(self.incident_from_fixture(incident_id))
    }

    async fn create_incident(&self, request: CreateTicketRequest) -> Result<Incident, RunbookError> {
        self.core.simulate_delay().await;
        let ticket_id = format!("INC{}", short_id().to_uppercase());
        let mut incident = Incident::from_report(request.description);
        incident.id = ticket_id.clone();
        incident.title = request.short_description;
        incident.severity = request.severity;
        incident.category = request.category;
        incident.created_at = Some(Utc::now());
        incident
            .metadata
            .insert("source".to_string(), Value::String("servicenow".to_string()));
        incident
            .metadata
            .insert("number".to_string(), Value::String(ticket_id));
        Ok(incident)
    }

    async fn update_incident(
        &self,
        incident_id: &str,
        updates: Map<String, Value>,
    ) -> Result<Incident, RunbookError> {
        self.core.simulate_delay().await;
        let mut incident = self.incident_from_fixture(incident_id);
        for (key, value) in updates {
            match key.as_str() {
                "title" => {
                    if let Value::String(title) = value {
                        incident.title = title;
                    }
                }
                "description" => {
                    if let Value::String(description) = value {
                        incident.description = description;
                    }
                }
                "status" => {
                    if let Ok(status) = serde_json::from_value(value) {
                        incident.status = status;
                    }
                }
                "severity" => {
                    if let Ok(severity) = serde_json::from_value(value) {
                        incident.severity = severity;
                    }
                }
                "category" => {
                    if let Ok(category) = serde_json::from_value(value) {
                        incident.category = category;
                    }
                }
                _ => {
                    incident.metadata.insert(key, value);
                }
            }
        }
        Ok(incident)
    }

    async fn get_recent_changes(&self, _timeframe: &str) -> Result<Vec<ChangeRecord>, RunbookError> {
        self.core.simulate_delay().await;
        parse_fixture("servicenow", Value::Array(self.core.list("recent_changes")))
    }

    async fn add_work_note(&self, incident_id: &str, note: &str) -> Result<(), RunbookError> {
        self.core.simulate_delay().await;
        self.work_notes
            .lock()
            .unwrap()
            .entry(incident_id.to_string())
            .or_default()
            .push(note.to_string());
        Ok(())
    }

    async fn search_knowledge_base(&self, _query: &str) -> Result<Vec<KbArticle>, RunbookError> {
        self.core.simulate_delay().await;
        parse_fixture("servicenow", Value::Array(self.core.list("knowledge_base")))
    }
}
