//! Payment API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /payments/order`.
///
/// When `amount_inr` is omitted the server falls back to its configured
/// listing fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub listing_id: Uuid,
    pub amount_inr: Option<i64>,
}

/// Response of `POST /payments/order`, handed to the checkout frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub provider_order_id: String,
    pub amount_paise: i64,
    pub currency: String,
}

/// Body of `POST /payments/verify`.
///
/// Field names follow the gateway's checkout callback payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub signature: String,
}

/// Response of `POST /payments/verify`.
///
/// `activated` is false when the confirmation was a duplicate delivery;
/// the call is still a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub activated: bool,
}
