//! Use cases - the drivers of the incident lifecycle.
//!
//! - [`orchestrator`] - classify → gather → diagnose → recommend → gate →
//!   execute → verify → summarize
//! - [`runbook_executor`] - declarative YAML workflows over the same ports

pub mod orchestrator;
pub mod runbook_executor;
