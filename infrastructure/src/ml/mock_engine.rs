//! Mock ML engine - scenario-aware canned responses, no API key needed.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use runbook_application::ports::ml_engine::MlEngine;
use runbook_domain::incident::entities::{Finding, Incident};
use runbook_domain::incident::value_objects::{
    Classification, DiagnosticResult, RecommendationSet,
};
use runbook_domain::RunbookError;

use crate::config::Settings;

pub struct MockMlEngine {
    scenario: String,
    delay_enabled: bool,
}

impl MockMlEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            scenario: settings.mock_scenario.clone(),
            delay_enabled: settings.mock_delay_enabled,
        }
    }

    async fn simulate_delay(&self, millis: u64) {
        if self.delay_enabled {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

#[async_trait]
impl MlEngine for MockMlEngine {
    async fn classify(&self, _problem_description: &str) -> Result<Classification, RunbookError> {
        self.simulate_delay(100).await;
        Ok(canned_classification(&self.scenario))
    }

    async fn diagnose(
        &self,
        _problem_description: &str,
        _findings: &[Finding],
    ) -> Result<DiagnosticResult, RunbookError> {
        self.simulate_delay(200).await;
        Ok(canned_diagnosis(&self.scenario))
    }

    async fn recommend(
        &self,
        _problem_description: &str,
        _diagnosis: &DiagnosticResult,
        _findings: &[Finding],
    ) -> Result<RecommendationSet, RunbookError> {
        self.simulate_delay(200).await;
        Ok(canned_recommendations(&self.scenario))
    }

    async fn summarize(&self, _incident: &Incident) -> Result<String, RunbookError> {
        self.simulate_delay(100).await;
        Ok(canned_summary(&self.scenario))
    }
}

fn canned_classification(scenario: &str) -> Classification {
    let value = match scenario {
        "high_cpu" => json!({
            "category": "compute",
            "severity": "high",
            "confidence": 0.94,
            "reasoning": "CPU usage at 94% on a production web server with OOM killer activity indicates a compute resource issue.",
        }),
        "database_connection" => json!({
            "category": "database",
            "severity": "critical",
            "confidence": 0.96,
            "reasoning": "Connection pool at 100% capacity with 'too many connections' errors across multiple services.",
        }),
        "deployment_failure" => json!({
            "category": "deployment",
            "severity": "high",
            "confidence": 0.97,
            "reasoning": "Partial rollout failure with health check failures on newly deployed instances.",
        }),
        "network_latency" => json!({
            "category": "network",
            "severity": "high",
            "confidence": 0.92,
            "reasoning": "Region-specific latency spike affecting EU users while US region remains normal.",
        }),
        _ => json!({
            "category": "unknown",
            "severity": "medium",
            "confidence": 0.5,
            "reasoning": "Unable to classify; scenario not recognized by the mock engine.",
        }),
    };
    serde_json::from_value(value).expect("canned classification is valid")
}

fn canned_diagnosis(scenario: &str) -> DiagnosticResult {
    let value = match scenario {
        "high_cpu" => json!({
            "root_cause": "Memory leak in web-app v2.14.3 deployed two hours ago causing excessive garbage collection and CPU consumption.",
            "evidence_summary": "Java process consuming 89.3% CPU on prod-web-03. GC pauses exceeding 5000ms. OOM killer invoked. CPU spike timing correlates with deployment CHG0004567.",
            "confidence": 0.91,
            "contributing_factors": [
                "Deployment of v2.14.3 introduced a memory leak",
                "No memory limit configured for the JVM heap",
                "OOM killer creating cascading restarts",
            ],
            "affected_components": ["prod-web-03", "web-app v2.14.3", "java process"],
        }),
        "database_connection" => json!({
            "root_cause": "Newly deployed inventory-service v1.0.0 opens database connections without pooling, exhausting the pool on db-primary-01.",
            "evidence_summary": "Connection count jumped from 45 to the 200 maximum after the inventory-service deployment. Multiple idle connections attributed to inventory-service while other services fail to acquire.",
            "confidence": 0.93,
            "contributing_factors": [
                "inventory-service v1.0.0 deployed without connection pooling",
                "No per-service connection limit enforced at the database",
            ],
            "affected_components": ["db-primary-01", "inventory-service", "order-service"],
        }),
        "deployment_failure" => json!({
            "root_cause": "checkout-service v3.1.0 is missing the PAYMENT_GATEWAY_V2_URL environment variable, causing immediate startup failure on new instances.",
            "evidence_summary": "3 of 8 instances running v3.1.0 crash on startup with a missing-variable error. The variable was added to staging (CHG0004695) but never propagated to production.",
            "confidence": 0.97,
            "contributing_factors": [
                "Environment variable added to staging but not production",
                "Rolling update continued despite the first instance failure",
            ],
            "affected_components": ["checkout-service", "checkout-pod-06", "checkout-pod-07"],
        }),
        "network_latency" => json!({
            "root_cause": "CDN routing rule change (CHG0004800) redirected EU traffic through the US-East origin, adding ~4500ms of cross-Atlantic latency.",
            "evidence_summary": "EU latency jumped from 180ms to 4500ms at 10:30 UTC, exactly when the CDN change was applied. Cache miss rate at 95%. US region unaffected.",
            "confidence": 0.95,
            "contributing_factors": [
                "CDN routing rule change for cost optimization",
                "No latency canary or automated rollback on CDN changes",
            ],
            "affected_components": ["cdn-eu-west", "api-gateway-eu", "EU user traffic"],
        }),
        _ => json!({
            "root_cause": "Unknown; the mock engine has no canned data for this scenario.",
            "evidence_summary": "No scenario-specific evidence available.",
            "confidence": 0.0,
        }),
    };
    serde_json::from_value(value).expect("canned diagnosis is valid")
}

fn canned_recommendations(scenario: &str) -> RecommendationSet {
    let value = match scenario {
        "high_cpu" => json!({
            "summary": "Restart the affected service immediately, then plan a rollback of v2.14.3.",
            "requires_immediate_action": true,
            "recommendations": [
                {
                    "description": "Restart the java service on prod-web-03 to relieve immediate CPU pressure",
                    "risk_level": "medium",
                    "requires_approval": true,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "prod-web-03", "service": "java"},
                    "reasoning": "Immediate relief while the rollback is prepared.",
                },
                {
                    "description": "Roll back the deployment from v2.14.3 to v2.14.2",
                    "risk_level": "high",
                    "requires_approval": true,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "prod-web-03", "service": "java", "version": "2.14.2"},
                    "reasoning": "Removes the code with the memory leak.",
                },
                {
                    "description": "Notify the platform-alerts channel about the incident",
                    "risk_level": "low",
                    "requires_approval": false,
                    "integration": "communication",
                    "method": "send_message",
                    "params": {"channel": "platform-alerts", "message": "Investigating high CPU on prod-web-03. Service restart in progress."},
                    "reasoning": "Keep the team informed during incident response.",
                },
            ],
        }),
        "database_connection" => json!({
            "summary": "Restart inventory-service with connection pooling enabled, and temporarily raise max_connections.",
            "requires_immediate_action": true,
            "recommendations": [
                {
                    "description": "Restart inventory-service with connection pooling configured (pool_size=10)",
                    "risk_level": "medium",
                    "requires_approval": true,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "inventory-service", "service": "inventory-service"},
                    "reasoning": "Fixes the root cause by reusing connections.",
                },
                {
                    "description": "Notify the database-alerts channel",
                    "risk_level": "low",
                    "requires_approval": false,
                    "integration": "communication",
                    "method": "send_message",
                    "params": {"channel": "database-alerts", "message": "DB connection exhaustion on db-primary-01. Root cause identified as inventory-service; fix in progress."},
                    "reasoning": "Keep the database team informed.",
                },
            ],
        }),
        "deployment_failure" => json!({
            "summary": "Roll back checkout-service to v3.0.9, then add the missing environment variable to production config.",
            "requires_immediate_action": true,
            "recommendations": [
                {
                    "description": "Roll back checkout-service from v3.1.0 to v3.0.9",
                    "risk_level": "high",
                    "requires_approval": true,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "checkout-service", "service": "checkout-service", "version": "3.0.9"},
                    "reasoning": "Restores all instances to the last known good version.",
                },
                {
                    "description": "Add PAYMENT_GATEWAY_V2_URL to the production environment config",
                    "risk_level": "low",
                    "requires_approval": false,
                    "reasoning": "Required before re-attempting the v3.1.0 deployment.",
                },
                {
                    "description": "Notify the deploy-notifications channel",
                    "risk_level": "low",
                    "requires_approval": false,
                    "integration": "communication",
                    "method": "send_message",
                    "params": {"channel": "deploy-notifications", "message": "Rolling back checkout-service v3.1.0 to v3.0.9 due to a missing env var."},
                    "reasoning": "Keep the team informed of rollback status.",
                },
            ],
        }),
        "network_latency" => json!({
            "summary": "Revert the CDN routing configuration change to restore EU traffic to the EU-West origin.",
            "requires_immediate_action": true,
            "recommendations": [
                {
                    "description": "Revert CDN routing rule change CHG0004800 to restore the EU-West origin",
                    "risk_level": "medium",
                    "requires_approval": true,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "cdn-eu-west", "service": "cdn"},
                    "reasoning": "Directly reverses the misconfiguration causing EU latency.",
                },
                {
                    "description": "Flush the CDN cache for the EU region",
                    "risk_level": "low",
                    "requires_approval": false,
                    "integration": "compute",
                    "method": "restart_service",
                    "params": {"host": "cdn-eu-west", "service": "varnish"},
                    "reasoning": "The cache may contain stale entries routed through US-East.",
                },
            ],
        }),
        _ => json!({
            "summary": "No specific recommendations; scenario not recognized by the mock engine.",
        }),
    };
    serde_json::from_value(value).expect("canned recommendations are valid")
}

fn canned_summary(scenario: &str) -> String {
    match scenario {
        "high_cpu" => "At approximately 10:28 UTC a high CPU alert was triggered on prod-web-03 \
            with utilization reaching 94.2%, alongside elevated memory usage. Investigation showed \
            the Java application process consuming 89.3% of CPU with the OOM killer invoked and GC \
            pauses over 5000ms, pointing at a severe memory leak. Change review identified \
            deployment CHG0004567 (web-app v2.14.3) completed about two hours before the spike.\n\n\
            The root cause was a memory leak introduced in v2.14.3. The recommended actions were \
            to restart the affected service for immediate relief and to roll back to v2.14.2 for \
            a permanent fix."
            .to_string(),
        "database_connection" => "At approximately 14:08 UTC a critical alert fired for \
            db-primary-01: connections at 100% of capacity (200/200), with multiple services \
            reporting 'too many connections'. The exhaustion traced to the newly deployed \
            inventory-service v1.0.0 (CHG0004600), which opened direct connections without \
            pooling.\n\nThe recommended resolution was to restart inventory-service with pooling \
            enabled and temporarily raise max_connections for headroom during the fix."
            .to_string(),
        "deployment_failure" => "At approximately 16:42 UTC health check failures appeared on \
            checkout-service instances running the new v3.1.0 build; all three updated instances \
            were crash-looping on startup with a missing PAYMENT_GATEWAY_V2_URL variable. The \
            variable had been added to staging (CHG0004695) but never to production.\n\nThe \
            recommended action was an immediate rollback to v3.0.9, followed by adding the missing \
            variable to production config before re-attempting the deployment."
            .to_string(),
        "network_latency" => "Starting at approximately 10:30 UTC, EU users experienced page \
            loads of 4-5 seconds versus a 180ms baseline while the US region was unaffected. CDN \
            routing change CHG0004800 had pointed the EU-West origin at us-east-1, forcing \
            cross-Atlantic round trips and driving the cache miss rate to 95%.\n\nThe recommended \
            resolution was to revert the routing rule and flush the EU cache."
            .to_string(),
        _ => "No summary available for this scenario.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runbook_domain::incident::enums::{ProblemCategory, Severity};

    fn engine(scenario: &str) -> MockMlEngine {
        MockMlEngine::new(&Settings {
            mock_scenario: scenario.to_string(),
            mock_delay_enabled: false,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn scenario_classification_is_canned() {
        let c = engine("database_connection").classify("whatever").await.unwrap();
        assert_eq!(c.category, ProblemCategory::Database);
        assert_eq!(c.severity, Severity::Critical);
    }

    #[tokio::test]
    async fn unknown_scenario_degrades() {
        let engine = engine("mystery");
        let c = engine.classify("whatever").await.unwrap();
        assert_eq!(c.category, ProblemCategory::Unknown);
        assert_eq!(c.confidence, 0.5);

        let d = engine.diagnose("whatever", &[]).await.unwrap();
        assert_eq!(d.confidence, 0.0);

        let r = engine
            .recommend("whatever", &d, &[])
            .await
            .unwrap();
        assert!(r.recommendations.is_empty());
    }

    #[tokio::test]
    async fn high_cpu_recommendations_target_the_compute_provider() {
        let engine = engine("high_cpu");
        let d = engine.diagnose("cpu", &[]).await.unwrap();
        let set = engine.recommend("cpu", &d, &[]).await.unwrap();

        assert_eq!(set.recommendations.len(), 3);
        assert_eq!(set.recommendations[0].integration.as_deref(), Some("compute"));
        assert!(set.recommendations[0].requires_approval);
        assert!(!set.recommendations[2].requires_approval);
    }

    #[tokio::test]
    async fn every_scenario_has_a_summary() {
        for scenario in Settings::available_scenarios() {
            let summary = engine(scenario)
                .summarize(&Incident::from_report("x"))
                .await
                .unwrap();
            assert!(!summary.is_empty());
        }
    }
}
