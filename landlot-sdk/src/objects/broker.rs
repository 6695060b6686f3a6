//! Broker API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /brokers`.
///
/// The phone number is normalized into a messaging-channel-qualified
/// contact address on the server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSignupRequest {
    pub name: String,
    pub agency: String,
    pub phone_number: String,
}

/// Response of `POST /brokers`.
///
/// Signing up an already-registered contact address returns the existing
/// registration with `already_registered = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSignupResponse {
    pub broker_id: Uuid,
    pub already_registered: bool,
}
