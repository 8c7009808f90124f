//! Integration registry - resolves and caches providers per category.
//!
//! Mode resolution supports piecewise cutover: a per-integration override
//! (e.g. `DATADOG_MODE=datadog`) selects a live vendor for that category
//! while everything else stays mocked. Providers are constructed once and
//! cached by category; only one mode per category is active at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use runbook_application::ports::integrations::{
    AlertingProvider, CommunicationProvider, ComputeProvider, MonitoringProvider,
    TicketingProvider,
};
use runbook_application::ports::registry::ProviderRegistry;
use runbook_domain::integration::category::IntegrationCategory;
use runbook_domain::RunbookError;

use crate::config::Settings;
use crate::mocks::aws::MockAws;
use crate::mocks::datadog::MockDatadog;
use crate::mocks::pagerduty::MockPagerDuty;
use crate::mocks::servicenow::MockServiceNow;
use crate::mocks::slack::MockSlack;

/// Mode keyword → the category it belongs to.
const MODE_TO_CATEGORY: &[(&str, IntegrationCategory)] = &[
    ("servicenow", IntegrationCategory::Ticketing),
    ("jira", IntegrationCategory::Ticketing),
    ("datadog", IntegrationCategory::Monitoring),
    ("pagerduty", IntegrationCategory::Alerting),
    ("aws", IntegrationCategory::Compute),
    ("slack", IntegrationCategory::Communication),
];

/// One cached provider instance, tagged by capability.
#[derive(Clone)]
enum ProviderInstance {
    Ticketing(Arc<dyn TicketingProvider>),
    Monitoring(Arc<dyn MonitoringProvider>),
    Alerting(Arc<dyn AlertingProvider>),
    Compute(Arc<dyn ComputeProvider>),
    Communication(Arc<dyn CommunicationProvider>),
}

pub struct IntegrationRegistry {
    settings: Settings,
    cache: Mutex<HashMap<IntegrationCategory, ProviderInstance>>,
}

impl IntegrationRegistry {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Effective mode for a category: the first non-empty, non-mock
    /// per-integration override wins, otherwise mock.
    fn resolve_mode(&self, category: IntegrationCategory) -> &str {
        for (mode_key, mode_category) in MODE_TO_CATEGORY {
            if *mode_category != category {
                continue;
            }
            let mode = self.settings.integration_mode(mode_key);
            if !mode.is_empty() && mode != "mock" {
                return mode_key;
            }
        }
        "mock"
    }

    fn construct(
        &self,
        category: IntegrationCategory,
        mode: &str,
    ) -> Result<ProviderInstance, RunbookError> {
        if mode != "mock" {
            // Live vendor clients plug in here; none ship with the engine.
            return Err(RunbookError::provider_mode_not_found(category.as_str(), mode));
        }
        Ok(match category {
            IntegrationCategory::Ticketing => {
                ProviderInstance::Ticketing(Arc::new(MockServiceNow::new(&self.settings)))
            }
            IntegrationCategory::Monitoring => {
                ProviderInstance::Monitoring(Arc::new(MockDatadog::new(&self.settings)))
            }
            IntegrationCategory::Alerting => {
                ProviderInstance::Alerting(Arc::new(MockPagerDuty::new(&self.settings)))
            }
            IntegrationCategory::Compute => {
                ProviderInstance::Compute(Arc::new(MockAws::new(&self.settings)))
            }
            IntegrationCategory::Communication => {
                ProviderInstance::Communication(Arc::new(MockSlack::new(&self.settings)))
            }
        })
    }

    fn instance(&self, category: IntegrationCategory) -> Result<ProviderInstance, RunbookError> {
        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.get(&category) {
            return Ok(cached.clone());
        }
        let mode = self.resolve_mode(category).to_string();
        let instance = self.construct(category, &mode)?;
        cache.insert(category, instance.clone());
        Ok(instance)
    }
}

impl ProviderRegistry for IntegrationRegistry {
    fn ticketing(&self) -> Result<Arc<dyn TicketingProvider>, RunbookError> {
        match self.instance(IntegrationCategory::Ticketing)? {
            ProviderInstance::Ticketing(provider) => Ok(provider),
            _ => Err(RunbookError::provider_not_found("ticketing")),
        }
    }

    fn monitoring(&self) -> Result<Arc<dyn MonitoringProvider>, RunbookError> {
        match self.instance(IntegrationCategory::Monitoring)? {
            ProviderInstance::Monitoring(provider) => Ok(provider),
            _ => Err(RunbookError::provider_not_found("monitoring")),
        }
    }

    fn alerting(&self) -> Result<Arc<dyn AlertingProvider>, RunbookError> {
        match self.instance(IntegrationCategory::Alerting)? {
            ProviderInstance::Alerting(provider) => Ok(provider),
            _ => Err(RunbookError::provider_not_found("alerting")),
        }
    }

    fn compute(&self) -> Result<Arc<dyn ComputeProvider>, RunbookError> {
        match self.instance(IntegrationCategory::Compute)? {
            ProviderInstance::Compute(provider) => Ok(provider),
            _ => Err(RunbookError::provider_not_found("compute")),
        }
    }

    fn communication(&self) -> Result<Arc<dyn CommunicationProvider>, RunbookError> {
        match self.instance(IntegrationCategory::Communication)? {
            ProviderInstance::Communication(provider) => Ok(provider),
            _ => Err(RunbookError::provider_not_found("communication")),
        }
    }

    fn reset(&self) {
        self.cache.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> IntegrationRegistry {
        IntegrationRegistry::new(Settings {
            mock_delay_enabled: false,
            ..Default::default()
        })
    }

    #[test]
    fn providers_are_cached_per_category() {
        let registry = registry();
        let first = registry.ticketing().unwrap();
        let second = registry.ticketing().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reset_forces_reconstruction() {
        let registry = registry();
        let before = registry.ticketing().unwrap();
        registry.reset();
        let after = registry.ticketing().unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn categories_cache_independently() {
        let registry = registry();
        registry.monitoring().unwrap();
        registry.compute().unwrap();
        assert_eq!(registry.cache.lock().unwrap().len(), 2);
    }

    #[test]
    fn default_mode_is_mock_for_every_category() {
        let registry = registry();
        for category in IntegrationCategory::ALL {
            assert_eq!(registry.resolve_mode(category), "mock");
        }
    }

    #[test]
    fn override_selects_live_mode_and_fails_without_a_client() {
        let registry = IntegrationRegistry::new(Settings {
            datadog_mode: "datadog".to_string(),
            mock_delay_enabled: false,
            ..Default::default()
        });
        assert_eq!(registry.resolve_mode(IntegrationCategory::Monitoring), "datadog");

        let err = registry.monitoring().unwrap_err();
        assert!(matches!(
            err,
            RunbookError::ProviderNotFound { ref category, ref mode }
                if category == "monitoring" && mode.as_deref() == Some("datadog")
        ));

        // Other categories still resolve to mocks
        assert!(registry.ticketing().is_ok());
    }

    #[test]
    fn global_live_mode_selects_the_category_vendor() {
        // runbook_mode=live flips every category to its vendor keyword even
        // without a per-integration override.
        let registry = IntegrationRegistry::new(Settings {
            runbook_mode: "live".to_string(),
            mock_delay_enabled: false,
            ..Default::default()
        });
        assert_eq!(registry.resolve_mode(IntegrationCategory::Ticketing), "servicenow");
        assert_eq!(registry.resolve_mode(IntegrationCategory::Compute), "aws");
    }
}
