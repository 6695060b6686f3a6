//! Payment gateway seam.
//!
//! The Activation Controller never talks to the gateway itself; handlers
//! verify a confirmation through this trait and only then drive the
//! activation path.

pub mod razorpay;

use async_trait::async_trait;

/// A gateway order as returned by `create_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOrder {
    pub provider_order_id: String,
    pub amount_paise: i64,
    pub currency: String,
}

/// Errors from gateway order creation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gateway rejected order ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Creates payment orders and verifies confirmation signatures.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount_paise: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<ProviderOrder, GatewayError>;

    /// Check a checkout callback's HMAC signature. Pure computation, no
    /// network round trip.
    fn verify_signature(
        &self,
        provider_order_id: &str,
        provider_payment_id: &str,
        signature: &str,
    ) -> bool;
}
