//! Core domain concepts shared across all subdomains.
//!
//! - [`error::RunbookError`] - the error taxonomy every layer reports through
//! - [`id::short_id`] - short random identifiers for incidents, findings, and actions

pub mod error;
pub mod id;
