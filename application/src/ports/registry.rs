//! Provider registry port.
//!
//! Resolves the active provider for each integration category. The concrete
//! registry (mode resolution, construction, caching) lives in the
//! infrastructure layer; use cases only see this port.

use std::sync::Arc;

use runbook_domain::RunbookError;

use super::integrations::{
    AlertingProvider, CommunicationProvider, ComputeProvider, MonitoringProvider,
    TicketingProvider,
};

/// Category-keyed provider resolution.
///
/// For the lifetime of a registry each category yields the same instance
/// until [`ProviderRegistry::reset`] is called. Resolution is synchronous
/// and never suspends; the providers it hands out are where suspension
/// happens.
pub trait ProviderRegistry: Send + Sync {
    fn ticketing(&self) -> Result<Arc<dyn TicketingProvider>, RunbookError>;
    fn monitoring(&self) -> Result<Arc<dyn MonitoringProvider>, RunbookError>;
    fn alerting(&self) -> Result<Arc<dyn AlertingProvider>, RunbookError>;
    fn compute(&self) -> Result<Arc<dyn ComputeProvider>, RunbookError>;
    fn communication(&self) -> Result<Arc<dyn CommunicationProvider>, RunbookError>;

    /// Clear cached instances; subsequent calls re-construct.
    fn reset(&self);
}
