//! Integration categories and their method allow-lists.
//!
//! The allow-list below is the single source of truth for provider method
//! names: runbook parsing validates against it and runtime dispatch matches
//! on the same names. A method added to a provider trait must be added here
//! and to the category's dispatch table or it is unreachable.

use serde::{Deserialize, Serialize};

/// The five capability families the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationCategory {
    Ticketing,
    Monitoring,
    Alerting,
    Compute,
    Communication,
}

impl IntegrationCategory {
    pub const ALL: [IntegrationCategory; 5] = [
        IntegrationCategory::Ticketing,
        IntegrationCategory::Monitoring,
        IntegrationCategory::Alerting,
        IntegrationCategory::Compute,
        IntegrationCategory::Communication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationCategory::Ticketing => "ticketing",
            IntegrationCategory::Monitoring => "monitoring",
            IntegrationCategory::Alerting => "alerting",
            IntegrationCategory::Compute => "compute",
            IntegrationCategory::Communication => "communication",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ticketing" => Some(IntegrationCategory::Ticketing),
            "monitoring" => Some(IntegrationCategory::Monitoring),
            "alerting" => Some(IntegrationCategory::Alerting),
            "compute" => Some(IntegrationCategory::Compute),
            "communication" => Some(IntegrationCategory::Communication),
            _ => None,
        }
    }

    /// Method names a runbook step (or action) may invoke on this category.
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            IntegrationCategory::Ticketing => &[
                "get_incident",
                "create_incident",
                "update_incident",
                "get_recent_changes",
                "add_work_note",
                "search_knowledge_base",
            ],
            IntegrationCategory::Monitoring => &[
                "get_current_alerts",
                "get_metrics",
                "get_logs",
                "get_host_info",
                "get_top_processes",
            ],
            IntegrationCategory::Alerting => &[
                "get_active_incidents",
                "get_on_call",
                "trigger_alert",
                "acknowledge_alert",
            ],
            IntegrationCategory::Compute => &[
                "get_host_info",
                "get_top_processes",
                "restart_service",
            ],
            IntegrationCategory::Communication => &[
                "send_message",
                "create_channel",
                "get_recent_messages",
            ],
        }
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods().contains(&method)
    }
}

impl std::fmt::Display for IntegrationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_all_categories() {
        for category in IntegrationCategory::ALL {
            assert_eq!(IntegrationCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn vendor_modes_are_not_categories() {
        // "datadog" is a mode of the monitoring category, not a category
        assert_eq!(IntegrationCategory::parse("datadog"), None);
        assert_eq!(IntegrationCategory::parse("servicenow"), None);
    }

    #[test]
    fn allow_list_membership() {
        assert!(IntegrationCategory::Compute.has_method("restart_service"));
        assert!(IntegrationCategory::Monitoring.has_method("get_logs"));
        assert!(!IntegrationCategory::Communication.has_method("restart_service"));
        assert!(!IntegrationCategory::Ticketing.has_method("delete_everything"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&IntegrationCategory::Alerting).unwrap(),
            "\"alerting\""
        );
    }
}
