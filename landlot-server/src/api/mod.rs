//! HTTP API surface.
//!
//! Split into the public API (sellers, brokers, payment callbacks) and
//! the admin API (stats, audit log, manual re-broadcast).

pub mod admin;
pub mod extractors;
pub mod public;
