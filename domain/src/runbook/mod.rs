//! Runbook domain
//!
//! Declarative YAML workflows and their execution state.
//!
//! - [`definition`] - the validated [`definition::Runbook`] shape
//! - [`execution`] - per-run state: step results, approval gates
//! - [`template`] - `{{ ... }}` placeholder resolution (pure)
//! - [`coerce`] - normalizing provider return values into result mappings

pub mod coerce;
pub mod definition;
pub mod execution;
pub mod template;
