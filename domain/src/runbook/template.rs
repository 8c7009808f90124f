//! Template placeholder resolution.
//!
//! Placeholders have the form `{{ source.dotted.path }}` where the first
//! segment is either the literal `incident` or the id of a previously
//! executed step. Unresolvable placeholders are left verbatim so a provider
//! call records the unresolved form instead of silently receiving an empty
//! string. Resolution never suspends.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::incident::entities::Incident;

fn template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("template regex is valid"))
}

/// Traverse a dot-separated field path through nested JSON objects.
fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Render a resolved JSON value into the string that replaces a placeholder.
/// Strings render bare (no quotes); numbers and bools render plainly; nested
/// objects and arrays render as compact JSON text.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn resolve_against(value: &str, incident: &Value, step_results: &Map<String, Value>) -> String {
    template_re()
        .replace_all(value, |caps: &Captures<'_>| {
            let expr = &caps[1];
            let Some((source, field_path)) = expr.split_once('.') else {
                // A bare `{{ incident }}` has no field path; leave it alone.
                return caps[0].to_string();
            };

            let resolved = if source == "incident" {
                lookup_path(incident, field_path)
            } else {
                step_results
                    .get(source)
                    .and_then(|result| lookup_path(result, field_path))
            };

            resolved
                .and_then(render)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace `{{ incident.field }}` and `{{ step_id.field }}` placeholders in
/// a single string.
pub fn resolve_template(
    value: &str,
    incident: &Incident,
    step_results: &Map<String, Value>,
) -> String {
    let incident_value =
        serde_json::to_value(incident).expect("incident always serializes to JSON");
    resolve_against(value, &incident_value, step_results)
}

/// Recursively resolve all template placeholders inside a params mapping.
///
/// String leaves are interpolated, nested mappings recurse, list elements
/// resolve element-wise, and all other values pass through unchanged.
pub fn resolve_params(
    params: &Map<String, Value>,
    incident: &Incident,
    step_results: &Map<String, Value>,
) -> Map<String, Value> {
    let incident_value =
        serde_json::to_value(incident).expect("incident always serializes to JSON");
    resolve_params_inner(params, &incident_value, step_results)
}

fn resolve_params_inner(
    params: &Map<String, Value>,
    incident: &Value,
    step_results: &Map<String, Value>,
) -> Map<String, Value> {
    let mut resolved = Map::new();
    for (key, value) in params {
        let new_value = match value {
            Value::String(s) => Value::String(resolve_against(s, incident, step_results)),
            Value::Object(nested) => {
                Value::Object(resolve_params_inner(nested, incident, step_results))
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => {
                            Value::String(resolve_against(s, incident, step_results))
                        }
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        };
        resolved.insert(key.clone(), new_value);
    }
    resolved
}
