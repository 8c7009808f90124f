//! Integration domain
//!
//! - [`category::IntegrationCategory`] - the five capability families and
//!   their per-category method allow-lists
//! - [`records`] - typed records exchanged with providers

pub mod category;
pub mod records;
