//! Infrastructure layer for runbook-pilot
//!
//! Adapters for the application ports: environment-driven configuration,
//! the concrete integration registry with mode resolution and caching,
//! scenario-backed mock providers, ML engine implementations, and the
//! runbook YAML parser.

pub mod config;
pub mod ml;
pub mod mocks;
pub mod registry;
pub mod runbook;

pub use config::Settings;
pub use ml::{build_ml_engine, AnthropicEngine, MockMlEngine};
pub use registry::IntegrationRegistry;
pub use runbook::parser::RunbookParser;
