//! Prompt builders for the ML capabilities.
//!
//! Each builder returns a `(system, user)` pair. The system prompts pin the
//! response format to JSON so the parsers in [`super::parsing`] can do their
//! job; the user prompts carry the incident context.

use runbook_domain::incident::entities::{Finding, Incident};
use runbook_domain::incident::value_objects::DiagnosticResult;

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn classification_system() -> &'static str {
        r#"You are an expert IT operations analyst. Your job is to classify incoming problem reports into a category and severity level.

Respond ONLY with valid JSON in this exact format:
{
  "category": "<one of: compute, network, database, deployment, storage, security, application, unknown>",
  "severity": "<one of: low, medium, high, critical>",
  "confidence": <float between 0.0 and 1.0>,
  "reasoning": "<one sentence explaining your classification>"
}"#
    }

    pub fn classification_user(problem_description: &str) -> String {
        format!("Classify the following problem report:\n\n{problem_description}")
    }

    pub fn diagnosis_system() -> &'static str {
        r#"You are an expert IT operations analyst performing root cause analysis. You will be given a problem description and operational evidence gathered from monitoring, ticketing, and infrastructure systems.

Analyze the evidence and determine the most likely root cause.

Respond ONLY with valid JSON in this exact format:
{
  "root_cause": "<concise description of the root cause>",
  "evidence_summary": "<summary of the key evidence that supports your conclusion>",
  "confidence": <float between 0.0 and 1.0>,
  "contributing_factors": ["<factor 1>", "<factor 2>"],
  "affected_components": ["<component 1>", "<component 2>"]
}"#
    }

    pub fn diagnosis_user(problem_description: &str, findings: &[Finding]) -> String {
        format!(
            "PROBLEM:\n{problem_description}\n\n{}\n\nBased on the evidence above, determine the root cause.",
            format_findings(findings)
        )
    }

    pub fn resolution_system() -> &'static str {
        r#"You are an expert IT operations analyst recommending remediation actions. You will be given a problem description, a root cause diagnosis, and supporting evidence.

Recommend a ranked list of actions to resolve the issue. For each action, specify the risk level and whether human approval is required before execution.

Available integrations and methods:
- compute: restart_service
- ticketing: create_incident, update_incident, add_work_note
- communication: send_message, create_channel
- alerting: trigger_alert, acknowledge_alert

Respond ONLY with valid JSON in this exact format:
{
  "summary": "<one sentence summary of the resolution plan>",
  "requires_immediate_action": <true or false>,
  "recommendations": [
    {
      "description": "<what to do>",
      "risk_level": "<one of: low, medium, high, critical>",
      "requires_approval": <true or false>,
      "integration": "<integration category or null>",
      "method": "<method name or null>",
      "params": { "<key>": "<value>" },
      "reasoning": "<why this action>"
    }
  ]
}

Order recommendations from most to least important. Tag destructive or state-changing actions as requiring approval."#
    }

    pub fn resolution_user(
        problem_description: &str,
        diagnosis: &DiagnosticResult,
        findings: &[Finding],
    ) -> String {
        let factors = if diagnosis.contributing_factors.is_empty() {
            "None identified".to_string()
        } else {
            diagnosis.contributing_factors.join(", ")
        };
        let components = if diagnosis.affected_components.is_empty() {
            "None identified".to_string()
        } else {
            diagnosis.affected_components.join(", ")
        };
        let mut user = format!("PROBLEM:\n{problem_description}\n\nROOT CAUSE DIAGNOSIS:\n");
        user.push_str(&format!("  Root cause: {}\n", diagnosis.root_cause));
        user.push_str(&format!("  Evidence: {}\n", diagnosis.evidence_summary));
        user.push_str(&format!("  Confidence: {:.0}%\n", diagnosis.confidence * 100.0));
        user.push_str(&format!("  Contributing factors: {factors}\n"));
        user.push_str(&format!("  Affected components: {components}\n\n"));
        user.push_str(&format_findings(findings));
        user.push_str("\n\nRecommend actions to resolve this issue.");
        user
    }

    pub fn summarization_system() -> &'static str {
        r#"You are an expert IT operations analyst writing an incident summary. You will be given the full details of a resolved (or in-progress) incident including its timeline, findings, and actions taken.

Write a clear, concise incident summary suitable for a post-incident review. Include:
1. What happened (the problem)
2. Root cause
3. Key evidence that led to the diagnosis
4. Actions taken to resolve
5. Current status

Write in plain prose, 3-5 paragraphs. Be factual and concise."#
    }

    pub fn summarization_user(incident: &Incident) -> String {
        let mut lines = vec![
            format!("INCIDENT: {} - {}", incident.id, incident.title),
            format!("Status: {}", incident.status),
            format!("Severity: {}", incident.severity),
            format!("Category: {}", incident.category),
        ];

        if let Some(classification) = &incident.classification {
            lines.push(format!(
                "Classification: {} (confidence: {:.0}%)",
                classification.category,
                classification.confidence * 100.0
            ));
            if !classification.reasoning.is_empty() {
                lines.push(format!("  Reasoning: {}", classification.reasoning));
            }
        }

        if !incident.timeline.is_empty() {
            lines.push("\nTIMELINE:".to_string());
            for entry in &incident.timeline {
                lines.push(format!(
                    "  {} [{}] {}",
                    entry.timestamp.to_rfc3339(),
                    entry.event_type,
                    entry.summary
                ));
            }
        }

        if !incident.findings.is_empty() {
            lines.push("\nFINDINGS:".to_string());
            for finding in &incident.findings {
                lines.push(format!(
                    "  - [{:?}] {} (source: {})",
                    finding.finding_type, finding.summary, finding.source
                ));
            }
        }

        if !incident.actions.is_empty() {
            lines.push("\nACTIONS:".to_string());
            for action in &incident.actions {
                let state = if action.executed_at.is_some() {
                    "executed"
                } else if action.is_approved() {
                    "approved"
                } else {
                    "pending"
                };
                lines.push(format!(
                    "  - {} ({}, risk: {})",
                    action.description, state, action.risk_level
                ));
                if let Some(error) = &action.error {
                    lines.push(format!("    ERROR: {error}"));
                }
            }
        }

        lines.push("\nWrite the incident summary.".to_string());
        lines.join("\n")
    }
}

/// Format findings into a structured evidence block.
pub fn format_findings(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "No evidence gathered yet.".to_string();
    }
    let mut lines = vec!["GATHERED EVIDENCE:".to_string()];
    for (index, finding) in findings.iter().enumerate() {
        lines.push(format!(
            "  {}. [{:?}] {} (source: {}, confidence: {:.0}%)",
            index + 1,
            finding.finding_type,
            finding.summary,
            finding.source,
            finding.confidence * 100.0
        ));
        for (key, value) in &finding.details {
            lines.push(format!("      {key}: {value}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use runbook_domain::incident::enums::FindingType;

    #[test]
    fn diagnosis_user_includes_problem_and_evidence() {
        let finding = Finding::new(FindingType::Alert, "monitoring", "[high] cpu at 94%", 0.9);
        let user = PromptBuilder::diagnosis_user("CPU pegged on prod-web-03", &[finding]);
        assert!(user.contains("PROBLEM:\nCPU pegged on prod-web-03"));
        assert!(user.contains("GATHERED EVIDENCE:"));
        assert!(user.contains("cpu at 94%"));
    }

    #[test]
    fn empty_findings_say_so() {
        assert_eq!(format_findings(&[]), "No evidence gathered yet.");
    }

    #[test]
    fn summarization_user_reflects_incident_state() {
        let mut incident = Incident::from_report("EU latency spiked");
        incident.record(
            runbook_domain::incident::entities::TimelineEntry::new("created", "Incident created"),
        );
        let user = PromptBuilder::summarization_user(&incident);
        assert!(user.contains(&incident.id));
        assert!(user.contains("TIMELINE:"));
        assert!(user.contains("Write the incident summary."));
    }
}
