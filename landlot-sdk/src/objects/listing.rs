//! Listing API request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListingStatus, PaymentStatus};

/// Body of `POST /listings`.
///
/// Media is carried as already-stored URL references; binary ingestion
/// happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub seller_id: Uuid,
    pub title: String,
    pub location: String,
    pub area: String,
    pub price: Decimal,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub media_urls: Vec<String>,
}

/// Response of `POST /listings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingResponse {
    pub listing_id: Uuid,
    pub status: ListingStatus,
}

/// Full listing detail returned by the read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResponse {
    pub listing_id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub location: String,
    pub area: String,
    pub price: Decimal,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub media_urls: Vec<String>,
    pub status: ListingStatus,
    pub payment_status: PaymentStatus,
    pub broadcast_sent: bool,
    pub created_at: i64,
}
