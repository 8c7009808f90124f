//! Application layer for runbook-pilot
//!
//! Use cases (the orchestrator and the runbook executor) and the ports they
//! drive. Adapters for the ports live in the infrastructure layer.

pub mod ports;
pub mod use_cases;

pub use ports::integrations::{
    AlertingProvider, CommunicationProvider, ComputeProvider, MonitoringProvider,
    TicketingProvider,
};
pub use ports::ml_engine::MlEngine;
pub use ports::registry::ProviderRegistry;
pub use use_cases::orchestrator::Orchestrator;
pub use use_cases::runbook_executor::RunbookExecutor;
