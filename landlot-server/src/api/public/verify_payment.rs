use axum::{Json, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::payment_order::{CompletePaymentOrder, GetPaymentOrderByProviderId};
use landlot_core::framework::DatabaseProcessor;
use landlot_core::processors::ActivationOutcome;
use landlot_sdk::objects::payment::{VerifyPaymentRequest, VerifyPaymentResponse};

use crate::state::AppState;

use super::PublicApiError;

/// `POST /payments/verify` — verify the checkout callback and activate
/// the listing.
///
/// The signature is checked before anything is read or written. The
/// order completion and the listing transition are both conditional
/// updates, so redelivering the same callback is a safe no-op that
/// reports `activated = false`.
pub async fn verify_payment(
    state: axum::extract::State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, PublicApiError> {
    if !state.gateway.verify_signature(
        &request.provider_order_id,
        &request.provider_payment_id,
        &request.signature,
    ) {
        tracing::warn!(
            provider_order_id = %request.provider_order_id,
            "payment verification rejected: bad signature"
        );
        return Err(PublicApiError::InvalidSignature);
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let order = processor
        .process(GetPaymentOrderByProviderId {
            provider_order_id: request.provider_order_id.clone(),
        })
        .await
        .map_err(PublicApiError::Database)?
        .ok_or(PublicApiError::NotFound)?;

    // Conditional update; false means an earlier delivery already
    // completed this order. The activation below is its own guard, so we
    // still run it to absorb a crash between the two writes.
    let completed = processor
        .process(CompletePaymentOrder {
            provider_order_id: request.provider_order_id,
            provider_payment_id: request.provider_payment_id,
        })
        .await
        .map_err(PublicApiError::Database)?;

    let outcome = state.activation.confirm_payment(order.listing_id).await?;

    if completed {
        tracing::info!(
            listing_id = %order.listing_id,
            provider_order_id = %order.provider_order_id,
            "payment verified"
        );
    }

    Ok(Json(VerifyPaymentResponse {
        activated: outcome == ActivationOutcome::Activated,
    }))
}
