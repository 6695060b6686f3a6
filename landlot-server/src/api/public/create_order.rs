use axum::{Json, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::PaymentState;
use landlot_core::entities::listing::GetListingById;
use landlot_core::entities::payment_order::InsertPaymentOrder;
use landlot_core::framework::DatabaseProcessor;
use landlot_sdk::objects::payment::{CreateOrderRequest, CreateOrderResponse};

use crate::state::AppState;

use super::PublicApiError;

/// `POST /payments/order` — create a gateway order for a listing's fee.
///
/// Amounts are converted to paise before reaching the gateway. Asking
/// for an order on an already-paid listing is a conflict, not a
/// double-charge.
pub async fn create_order(
    state: axum::extract::State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let listing = processor
        .process(GetListingById {
            listing_id: request.listing_id,
        })
        .await
        .map_err(PublicApiError::Database)?
        .ok_or(PublicApiError::NotFound)?;

    if listing.payment_status == PaymentState::Paid {
        return Err(PublicApiError::AlreadyPaid);
    }

    let listing_fee_inr = state.config.payment.read().await.listing_fee_inr;
    let amount_paise = order_amount_paise(request.amount_inr, listing_fee_inr)
        .ok_or(PublicApiError::InvalidAmount)?;

    let provider_order = state
        .gateway
        .create_order(amount_paise, "INR", &request.listing_id.to_string())
        .await
        .map_err(PublicApiError::Gateway)?;

    let record = processor
        .process(InsertPaymentOrder {
            provider_order_id: provider_order.provider_order_id,
            listing_id: request.listing_id,
            amount_paise: provider_order.amount_paise,
            currency: provider_order.currency,
        })
        .await
        .map_err(PublicApiError::Database)?;

    tracing::info!(
        listing_id = %record.listing_id,
        provider_order_id = %record.provider_order_id,
        amount_paise = record.amount_paise,
        "payment order created"
    );

    Ok(Json(CreateOrderResponse {
        order_id: record.order_id,
        provider_order_id: record.provider_order_id,
        amount_paise: record.amount_paise,
        currency: record.currency,
    }))
}

/// Resolve the order amount in paise; the request amount is
/// caller-supplied, so non-positive and overflowing values are rejected
/// rather than forwarded to the gateway.
fn order_amount_paise(requested_inr: Option<i64>, listing_fee_inr: i64) -> Option<i64> {
    let amount_inr = requested_inr.unwrap_or(listing_fee_inr);
    if amount_inr <= 0 {
        return None;
    }
    amount_inr.checked_mul(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_amount_converts_to_paise() {
        assert_eq!(order_amount_paise(Some(500), 299), Some(50_000));
    }

    #[test]
    fn missing_amount_falls_back_to_listing_fee() {
        assert_eq!(order_amount_paise(None, 299), Some(29_900));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert_eq!(order_amount_paise(Some(0), 299), None);
        assert_eq!(order_amount_paise(Some(-299), 299), None);
    }

    #[test]
    fn overflowing_amount_is_rejected() {
        assert_eq!(order_amount_paise(Some(i64::MAX), 299), None);
    }
}
