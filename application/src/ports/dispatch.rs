//! String-named method dispatch over the provider contracts.
//!
//! Actions and runbook steps carry their target as `(category, method)`
//! strings plus a JSON params mapping. This module turns that dynamic form
//! into typed provider calls and coerces the typed return value back into a
//! result mapping.
//!
//! The match arms below cover exactly the names in
//! [`IntegrationCategory::methods`]; that allow-list is the contract shared
//! with runbook validation.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use runbook_domain::integration::category::IntegrationCategory;
use runbook_domain::integration::records::{LogQuery, MetricQuery};
use runbook_domain::runbook::coerce::to_result_map;
use runbook_domain::RunbookError;

use super::integrations::{
    AlertingProvider, CommunicationProvider, ComputeProvider, MonitoringProvider,
    TicketingProvider,
};
use super::registry::ProviderRegistry;

/// Invoke `method` on the provider for `category` with `params` as named
/// arguments, returning the normalized result mapping.
pub async fn call(
    registry: &dyn ProviderRegistry,
    category: &str,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, RunbookError> {
    let Some(parsed) = IntegrationCategory::parse(category) else {
        return Err(RunbookError::provider_not_found(category));
    };
    if !parsed.has_method(method) {
        return Err(method_not_found(parsed, method));
    }

    match parsed {
        IntegrationCategory::Ticketing => {
            call_ticketing(registry.ticketing()?, method, params).await
        }
        IntegrationCategory::Monitoring => {
            call_monitoring(registry.monitoring()?, method, params).await
        }
        IntegrationCategory::Alerting => call_alerting(registry.alerting()?, method, params).await,
        IntegrationCategory::Compute => call_compute(registry.compute()?, method, params).await,
        IntegrationCategory::Communication => {
            call_communication(registry.communication()?, method, params).await
        }
    }
}

fn method_not_found(category: IntegrationCategory, method: &str) -> RunbookError {
    RunbookError::integration(
        category.as_str(),
        format!("Method '{method}' not found on {category} provider"),
    )
}

fn missing_param(category: IntegrationCategory, method: &str, key: &str) -> RunbookError {
    RunbookError::integration(
        category.as_str(),
        format!("Method '{method}' requires param '{key}'"),
    )
}

/// Required string parameter, looked up by name.
fn str_param(
    category: IntegrationCategory,
    method: &str,
    params: &Map<String, Value>,
    key: &str,
) -> Result<String, RunbookError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing_param(category, method, key))
}

/// Optional string parameter with a fallback.
fn str_param_or(params: &Map<String, Value>, key: &str, default: &str) -> String {
    params
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Optional integer parameter with a fallback.
fn usize_param_or(params: &Map<String, Value>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Optional mapping parameter with an empty fallback.
fn map_param(params: &Map<String, Value>, key: &str) -> Map<String, Value> {
    params
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Record-typed arguments deserialize from the whole params mapping so
/// runbook authors write the record fields inline.
fn record_param<T: DeserializeOwned>(
    category: IntegrationCategory,
    method: &str,
    params: &Map<String, Value>,
) -> Result<T, RunbookError> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| {
        RunbookError::integration(
            category.as_str(),
            format!("Invalid params for method '{method}': {e}"),
        )
    })
}

fn dump<T: serde::Serialize>(value: &T) -> Map<String, Value> {
    let json = serde_json::to_value(value).unwrap_or(Value::Null);
    to_result_map(json)
}

async fn call_ticketing(
    provider: Arc<dyn TicketingProvider>,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, RunbookError> {
    let cat = IntegrationCategory::Ticketing;
    match method {
        "get_incident" => {
            let id = str_param(cat, method, params, "incident_id")?;
            Ok(dump(&provider.get_incident(&id).await?))
        }
        "create_incident" => {
            let request = record_param(cat, method, params)?;
            Ok(dump(&provider.create_incident(request).await?))
        }
        "update_incident" => {
            let id = str_param(cat, method, params, "incident_id")?;
            let updates = map_param(params, "updates");
            Ok(dump(&provider.update_incident(&id, updates).await?))
        }
        "get_recent_changes" => {
            let timeframe = str_param_or(params, "timeframe", "4h");
            Ok(dump(&provider.get_recent_changes(&timeframe).await?))
        }
        "add_work_note" => {
            let id = str_param(cat, method, params, "incident_id")?;
            let note = str_param(cat, method, params, "note")?;
            provider.add_work_note(&id, &note).await?;
            Ok(Map::new())
        }
        "search_knowledge_base" => {
            let query = str_param(cat, method, params, "query")?;
            Ok(dump(&provider.search_knowledge_base(&query).await?))
        }
        _ => Err(method_not_found(cat, method)),
    }
}

async fn call_monitoring(
    provider: Arc<dyn MonitoringProvider>,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, RunbookError> {
    let cat = IntegrationCategory::Monitoring;
    match method {
        "get_current_alerts" => {
            let filters = map_param(params, "filters");
            Ok(dump(&provider.get_current_alerts(filters).await?))
        }
        "get_metrics" => {
            let query: MetricQuery = record_param(cat, method, params)?;
            Ok(dump(&provider.get_metrics(query).await?))
        }
        "get_logs" => {
            let query: LogQuery = record_param(cat, method, params)?;
            Ok(dump(&provider.get_logs(query).await?))
        }
        "get_host_info" => {
            let hostname = str_param_or(params, "hostname", "");
            Ok(dump(&provider.get_host_info(&hostname).await?))
        }
        "get_top_processes" => {
            let hostname = str_param_or(params, "hostname", "");
            let limit = usize_param_or(params, "limit", 10);
            Ok(dump(&provider.get_top_processes(&hostname, limit).await?))
        }
        _ => Err(method_not_found(cat, method)),
    }
}

async fn call_alerting(
    provider: Arc<dyn AlertingProvider>,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, RunbookError> {
    let cat = IntegrationCategory::Alerting;
    match method {
        "get_active_incidents" => Ok(dump(&provider.get_active_incidents().await?)),
        "get_on_call" => {
            let schedule = str_param(cat, method, params, "schedule")?;
            Ok(dump(&provider.get_on_call(&schedule).await?))
        }
        "trigger_alert" => {
            let request = record_param(cat, method, params)?;
            provider.trigger_alert(request).await?;
            Ok(Map::new())
        }
        "acknowledge_alert" => {
            let alert_id = str_param(cat, method, params, "alert_id")?;
            provider.acknowledge_alert(&alert_id).await?;
            Ok(Map::new())
        }
        _ => Err(method_not_found(cat, method)),
    }
}

async fn call_compute(
    provider: Arc<dyn ComputeProvider>,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, RunbookError> {
    let cat = IntegrationCategory::Compute;
    match method {
        "get_host_info" => {
            let hostname = str_param_or(params, "hostname", "");
            Ok(dump(&provider.get_host_info(&hostname).await?))
        }
        "get_top_processes" => {
            let hostname = str_param_or(params, "hostname", "");
            let limit = usize_param_or(params, "limit", 10);
            Ok(dump(&provider.get_top_processes(&hostname, limit).await?))
        }
        "restart_service" => {
            // "host" is accepted as an alias for "hostname" - ML
            // recommendations commonly use the short form.
            let hostname = params
                .get("hostname")
                .or_else(|| params.get("host"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let service = str_param_or(params, "service", "");
            let options: Map<String, Value> = params
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "hostname" | "host" | "service"))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            Ok(provider.restart_service(&hostname, &service, options).await?)
        }
        _ => Err(method_not_found(cat, method)),
    }
}

async fn call_communication(
    provider: Arc<dyn CommunicationProvider>,
    method: &str,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, RunbookError> {
    let cat = IntegrationCategory::Communication;
    match method {
        "send_message" => {
            let channel = str_param(cat, method, params, "channel")?;
            let message = str_param(cat, method, params, "message")?;
            provider.send_message(&channel, &message).await?;
            Ok(Map::new())
        }
        "create_channel" => {
            let name = str_param(cat, method, params, "name")?;
            let purpose = str_param_or(params, "purpose", "");
            Ok(dump(&provider.create_channel(&name, &purpose).await?))
        }
        "get_recent_messages" => {
            let channel = str_param(cat, method, params, "channel")?;
            let limit = usize_param_or(params, "limit", 50);
            Ok(dump(&provider.get_recent_messages(&channel, limit).await?))
        }
        _ => Err(method_not_found(cat, method)),
    }
}
