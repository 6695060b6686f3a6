pub mod admin;
pub mod broker;
pub mod listing;
pub mod payment;

use serde::{Deserialize, Serialize};

/// Listing lifecycle state as exposed over the API.
///
/// This is the DTO version. For database operations, see
/// `landlot_core::entities::ListingStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    PendingPayment,
    Active,
}

/// Payment state of a listing as exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// Lifecycle of a payment order created with the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOrderStatus {
    Created,
    Completed,
}

/// Kind of a notification audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Broadcast,
}
