//! Built-in scenario fixture bundles.
//!
//! Each scenario is a coherent slice of an outage: the monitoring alerts,
//! logs, recent changes, host state, pager incidents, and chat traffic a
//! responder would find. Providers read their own section by vendor key.

use serde_json::{json, Map, Value};

/// Section of the named scenario belonging to one provider key
/// ("servicenow", "datadog", "pagerduty", "aws", "slack"). Unknown
/// scenarios and unknown keys yield an empty section.
pub fn provider_section(scenario: &str, provider_key: &str) -> Map<String, Value> {
    scenario_data(scenario)
        .as_object()
        .and_then(|sections| sections.get(provider_key))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn scenario_data(scenario: &str) -> Value {
    match scenario {
        "high_cpu" => high_cpu(),
        "database_connection" => database_connection(),
        "deployment_failure" => deployment_failure(),
        "network_latency" => network_latency(),
        _ => Value::Null,
    }
}

fn high_cpu() -> Value {
    json!({
        "datadog": {
            "alerts": [
                {
                    "id": "mon-10021",
                    "name": "cpu.utilization.high",
                    "host": "prod-web-03",
                    "value": 94.2,
                    "threshold": 90.0,
                    "status": "triggered",
                    "severity": "high",
                    "triggered_at": "2026-01-15T10:28:00Z",
                    "tags": {"env": "production", "service": "web-app"}
                },
                {
                    "id": "mon-10022",
                    "name": "memory.utilization.high",
                    "host": "prod-web-03",
                    "value": 87.5,
                    "threshold": 85.0,
                    "status": "triggered",
                    "severity": "medium",
                    "triggered_at": "2026-01-15T10:31:00Z",
                    "tags": {"env": "production", "service": "web-app"}
                }
            ],
            "logs": [
                {
                    "timestamp": "2026-01-15T10:27:12Z",
                    "level": "error",
                    "host": "prod-web-03",
                    "service": "web-app",
                    "message": "java.lang.OutOfMemoryError: GC overhead limit exceeded"
                },
                {
                    "timestamp": "2026-01-15T10:27:45Z",
                    "level": "warn",
                    "host": "prod-web-03",
                    "service": "web-app",
                    "message": "GC pause of 5212ms exceeded threshold"
                },
                {
                    "timestamp": "2026-01-15T10:29:03Z",
                    "level": "error",
                    "host": "prod-web-03",
                    "service": "kernel",
                    "message": "Out of memory: Killed process 12345 (java)"
                }
            ],
            "metrics": {
                "system.cpu.utilization": [
                    {"timestamp": "2026-01-15T10:00:00Z", "value": 42.1},
                    {"timestamp": "2026-01-15T10:10:00Z", "value": 61.8},
                    {"timestamp": "2026-01-15T10:20:00Z", "value": 88.4},
                    {"timestamp": "2026-01-15T10:30:00Z", "value": 94.2}
                ]
            },
            "host_info": {
                "hostname": "prod-web-03",
                "instance_id": "i-0f3a9c1b2d4e5f607",
                "instance_type": "m5.xlarge",
                "state": "running",
                "ip_address": "10.0.14.23",
                "region": "us-east-1",
                "tags": {"role": "web", "env": "production"}
            }
        },
        "servicenow": {
            "incident": {
                "id": "INC0012345",
                "number": "INC0012345",
                "short_description": "High CPU on prod-web-03",
                "description": "CPU utilization above 90% for 15 minutes",
                "status": "new",
                "severity": "high",
                "category": "compute"
            },
            "recent_changes": [
                {
                    "id": "chg-4567",
                    "number": "CHG0004567",
                    "description": "Deploy web-app v2.14.3 to production",
                    "status": "closed",
                    "created_at": "2026-01-15T08:30:00Z",
                    "closed_at": "2026-01-15T08:45:00Z",
                    "requested_by": "deploy-bot",
                    "category": "deployment"
                }
            ],
            "knowledge_base": [
                {
                    "id": "KB0001203",
                    "title": "Diagnosing JVM memory leaks in production",
                    "content": "Capture a heap dump with jmap, inspect dominator tree...",
                    "category": "runbooks",
                    "relevance_score": 0.87
                }
            ]
        },
        "pagerduty": {
            "incidents": [
                {
                    "id": "PD-7701",
                    "title": "High CPU on prod-web-03",
                    "status": "triggered",
                    "urgency": "high",
                    "service": "web-app",
                    "assigned_to": "sam.oncall",
                    "created_at": "2026-01-15T10:29:00Z"
                }
            ],
            "on_call": {
                "user": "sam.oncall",
                "schedule": "primary",
                "start": "2026-01-15T08:00:00Z",
                "end": "2026-01-16T08:00:00Z",
                "escalation_level": 1
            }
        },
        "aws": {
            "instance": {
                "hostname": "prod-web-03",
                "instance_id": "i-0f3a9c1b2d4e5f607",
                "instance_type": "m5.xlarge",
                "state": "running",
                "ip_address": "10.0.14.23",
                "region": "us-east-1",
                "tags": {"role": "web", "env": "production"}
            },
            "top_processes": [
                {"pid": 12345, "name": "java", "cpu_percent": 89.3, "memory_percent": 72.4, "user": "webapp", "command": "java -Xmx4g -jar web-app.jar"},
                {"pid": 2201, "name": "nginx", "cpu_percent": 3.1, "memory_percent": 1.8, "user": "nginx", "command": "nginx: worker process"},
                {"pid": 1180, "name": "dd-agent", "cpu_percent": 1.2, "memory_percent": 2.3, "user": "dd-agent", "command": "datadog-agent run"},
                {"pid": 890, "name": "sshd", "cpu_percent": 0.1, "memory_percent": 0.4, "user": "root", "command": "sshd -D"}
            ]
        },
        "slack": {
            "recent_messages": [
                {
                    "id": "msg-3301",
                    "channel": "platform-alerts",
                    "text": "Anyone else seeing prod-web-03 slow to respond?",
                    "author": "jordan.dev",
                    "timestamp": "2026-01-15T10:26:00Z"
                }
            ]
        }
    })
}

fn database_connection() -> Value {
    json!({
        "datadog": {
            "alerts": [
                {
                    "id": "mon-20014",
                    "name": "postgresql.connections.saturated",
                    "host": "db-primary-01",
                    "value": 200.0,
                    "threshold": 180.0,
                    "status": "triggered",
                    "severity": "critical",
                    "triggered_at": "2026-01-20T14:08:00Z",
                    "tags": {"env": "production", "service": "postgresql"}
                }
            ],
            "logs": [
                {
                    "timestamp": "2026-01-20T14:07:40Z",
                    "level": "error",
                    "host": "db-primary-01",
                    "service": "postgresql",
                    "message": "FATAL: sorry, too many clients already"
                },
                {
                    "timestamp": "2026-01-20T14:08:15Z",
                    "level": "error",
                    "host": "order-service-02",
                    "service": "order-service",
                    "message": "could not acquire connection from pool within 5000ms"
                }
            ],
            "metrics": {
                "postgresql.connections.active": [
                    {"timestamp": "2026-01-20T13:00:00Z", "value": 45.0},
                    {"timestamp": "2026-01-20T13:30:00Z", "value": 120.0},
                    {"timestamp": "2026-01-20T14:00:00Z", "value": 200.0}
                ]
            },
            "host_info": {
                "hostname": "db-primary-01",
                "instance_id": "i-0d1e2f3a4b5c6d7e8",
                "instance_type": "r5.2xlarge",
                "state": "running",
                "ip_address": "10.0.20.11",
                "region": "us-east-1",
                "tags": {"role": "database", "env": "production"}
            }
        },
        "servicenow": {
            "recent_changes": [
                {
                    "id": "chg-4600",
                    "number": "CHG0004600",
                    "description": "Deploy inventory-service v1.0.0",
                    "status": "closed",
                    "created_at": "2026-01-20T12:30:00Z",
                    "closed_at": "2026-01-20T13:00:00Z",
                    "requested_by": "maya.eng",
                    "category": "deployment"
                }
            ],
            "knowledge_base": []
        },
        "pagerduty": {
            "incidents": [
                {
                    "id": "PD-7840",
                    "title": "Connection pool exhaustion on db-primary-01",
                    "status": "triggered",
                    "urgency": "high",
                    "service": "postgresql",
                    "created_at": "2026-01-20T14:09:00Z"
                }
            ],
            "on_call": {"user": "dana.dba", "schedule": "database", "escalation_level": 1}
        },
        "aws": {
            "instance": {
                "hostname": "db-primary-01",
                "instance_id": "i-0d1e2f3a4b5c6d7e8",
                "instance_type": "r5.2xlarge",
                "state": "running",
                "region": "us-east-1"
            },
            "top_processes": [
                {"pid": 4001, "name": "postgres", "cpu_percent": 64.0, "memory_percent": 55.2, "user": "postgres", "command": "postgres: checkpointer"},
                {"pid": 4050, "name": "postgres", "cpu_percent": 22.5, "memory_percent": 12.0, "user": "postgres", "command": "postgres: inventory inventory_db idle"}
            ]
        },
        "slack": {
            "recent_messages": [
                {
                    "id": "msg-4410",
                    "channel": "database-alerts",
                    "text": "order-service is throwing connection errors, db team aware?",
                    "author": "li.sre",
                    "timestamp": "2026-01-20T14:06:00Z"
                }
            ]
        }
    })
}

fn deployment_failure() -> Value {
    json!({
        "datadog": {
            "alerts": [
                {
                    "id": "mon-30007",
                    "name": "healthcheck.failing",
                    "host": "checkout-pod-06",
                    "value": 3.0,
                    "threshold": 1.0,
                    "status": "triggered",
                    "severity": "high",
                    "triggered_at": "2026-01-22T16:42:00Z",
                    "tags": {"env": "production", "service": "checkout-service"}
                }
            ],
            "logs": [
                {
                    "timestamp": "2026-01-22T16:41:30Z",
                    "level": "error",
                    "host": "checkout-pod-06",
                    "service": "checkout-service",
                    "message": "Required environment variable PAYMENT_GATEWAY_V2_URL is not set"
                },
                {
                    "timestamp": "2026-01-22T16:41:55Z",
                    "level": "error",
                    "host": "checkout-pod-07",
                    "service": "checkout-service",
                    "message": "Required environment variable PAYMENT_GATEWAY_V2_URL is not set"
                }
            ],
            "metrics": {
                "healthcheck.failures": [
                    {"timestamp": "2026-01-22T16:40:00Z", "value": 0.0},
                    {"timestamp": "2026-01-22T16:42:00Z", "value": 3.0}
                ],
                "rollback.count": []
            },
            "host_info": {
                "hostname": "checkout-pod-06",
                "instance_id": "i-0b9c8d7e6f5a4b3c2",
                "instance_type": "c5.large",
                "state": "running",
                "region": "us-east-1"
            }
        },
        "servicenow": {
            "recent_changes": [
                {
                    "id": "chg-4690",
                    "number": "CHG0004690",
                    "description": "Deploy checkout-service v3.1.0 (rolling)",
                    "status": "in_progress",
                    "created_at": "2026-01-22T16:30:00Z",
                    "requested_by": "deploy-bot",
                    "category": "deployment"
                },
                {
                    "id": "chg-4695",
                    "number": "CHG0004695",
                    "description": "Add PAYMENT_GATEWAY_V2_URL to staging config",
                    "status": "closed",
                    "created_at": "2026-01-21T11:00:00Z",
                    "closed_at": "2026-01-21T11:20:00Z",
                    "requested_by": "maya.eng",
                    "category": "configuration"
                }
            ],
            "knowledge_base": []
        },
        "pagerduty": {
            "incidents": [
                {
                    "id": "PD-7990",
                    "title": "checkout-service health checks failing",
                    "status": "triggered",
                    "urgency": "high",
                    "service": "checkout-service",
                    "created_at": "2026-01-22T16:43:00Z"
                }
            ],
            "on_call": {"user": "ravi.platform", "schedule": "primary", "escalation_level": 1}
        },
        "aws": {
            "instance": {
                "hostname": "checkout-pod-06",
                "instance_id": "i-0b9c8d7e6f5a4b3c2",
                "instance_type": "c5.large",
                "state": "running",
                "region": "us-east-1"
            },
            "top_processes": [
                {"pid": 700, "name": "checkout-service", "cpu_percent": 0.0, "memory_percent": 0.0, "user": "app", "command": "checkout-service (crash-looping)"}
            ]
        },
        "slack": {
            "recent_messages": [
                {
                    "id": "msg-5520",
                    "channel": "deploy-notifications",
                    "text": "checkout-service v3.1.0 rollout paused at 3/8 instances",
                    "author": "deploy-bot",
                    "timestamp": "2026-01-22T16:44:00Z"
                }
            ]
        }
    })
}

fn network_latency() -> Value {
    json!({
        "datadog": {
            "alerts": [
                {
                    "id": "mon-40019",
                    "name": "latency.p95.high",
                    "host": "api-gateway-eu",
                    "value": 4500.0,
                    "threshold": 500.0,
                    "status": "triggered",
                    "severity": "high",
                    "triggered_at": "2026-01-25T10:32:00Z",
                    "tags": {"env": "production", "region": "eu-west-1"}
                }
            ],
            "logs": [
                {
                    "timestamp": "2026-01-25T10:31:10Z",
                    "level": "warn",
                    "host": "cdn-eu-west",
                    "service": "cdn",
                    "message": "origin us-east-1-origin.example.com responded in 4213ms"
                },
                {
                    "timestamp": "2026-01-25T10:33:02Z",
                    "level": "warn",
                    "host": "cdn-eu-west",
                    "service": "cdn",
                    "message": "cache miss rate 95% over last 5m"
                }
            ],
            "metrics": {
                "http.request.latency.p95": [
                    {"timestamp": "2026-01-25T10:00:00Z", "value": 180.0},
                    {"timestamp": "2026-01-25T10:30:00Z", "value": 4500.0}
                ]
            },
            "host_info": {
                "hostname": "api-gateway-eu",
                "instance_id": "i-0aa1bb2cc3dd4ee5f",
                "instance_type": "c5.xlarge",
                "state": "running",
                "region": "eu-west-1"
            }
        },
        "servicenow": {
            "recent_changes": [
                {
                    "id": "chg-4800",
                    "number": "CHG0004800",
                    "description": "CDN routing rule update for cost optimization",
                    "status": "closed",
                    "created_at": "2026-01-25T10:15:00Z",
                    "closed_at": "2026-01-25T10:30:00Z",
                    "requested_by": "networking-team",
                    "category": "network"
                }
            ],
            "knowledge_base": []
        },
        "pagerduty": {
            "incidents": [
                {
                    "id": "PD-8122",
                    "title": "EU page load times degraded 3x",
                    "status": "triggered",
                    "urgency": "high",
                    "service": "api-gateway",
                    "created_at": "2026-01-25T10:35:00Z"
                }
            ],
            "on_call": {"user": "noor.netops", "schedule": "network", "escalation_level": 1}
        },
        "aws": {
            "instance": {
                "hostname": "cdn-eu-west",
                "instance_id": "i-0aa1bb2cc3dd4ee5f",
                "instance_type": "c5.xlarge",
                "state": "running",
                "region": "eu-west-1"
            },
            "top_processes": [
                {"pid": 3100, "name": "varnish", "cpu_percent": 41.0, "memory_percent": 38.5, "user": "varnish", "command": "varnishd -a :80"}
            ]
        },
        "slack": {
            "recent_messages": [
                {
                    "id": "msg-6630",
                    "channel": "infra-alerts",
                    "text": "EU users reporting 4-5s page loads since ~10:30 UTC",
                    "author": "support-bridge",
                    "timestamp": "2026-01-25T10:34:00Z"
                }
            ]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_has_the_five_provider_sections() {
        for scenario in ["high_cpu", "database_connection", "deployment_failure", "network_latency"] {
            for key in ["servicenow", "datadog", "pagerduty", "aws", "slack"] {
                let section = provider_section(scenario, key);
                assert!(!section.is_empty(), "{scenario}/{key} section is empty");
            }
        }
    }

    #[test]
    fn unknown_scenario_is_empty() {
        assert!(provider_section("nope", "datadog").is_empty());
    }

    #[test]
    fn high_cpu_alerts_deserialize_as_records() {
        use runbook_domain::integration::records::Alert;
        let section = provider_section("high_cpu", "datadog");
        let alerts: Vec<Alert> =
            serde_json::from_value(section["alerts"].clone()).expect("alerts parse");
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].is_active());
        assert_eq!(alerts[0].host.as_deref(), Some("prod-web-03"));
    }
}
