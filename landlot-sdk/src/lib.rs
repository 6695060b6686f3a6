//! Shared objects for the Landlot listing server.
//!
//! This crate defines the wire types exchanged between the server and its
//! clients (sellers, brokers, admin dashboards) together with the payment
//! signature scheme used to confirm gateway payments.

pub mod objects;
pub mod signature;
