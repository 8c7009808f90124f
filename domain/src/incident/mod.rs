//! Incident domain
//!
//! The incident aggregate and everything attached to it: gathered findings,
//! recommended/executed actions, the append-only timeline, and the value
//! objects the ML capability produces.

pub mod entities;
pub mod enums;
pub mod value_objects;
