use axum::{extract::Path, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::listing::GetListingById;
use landlot_core::events::{BroadcastRequest, BroadcastTrigger};
use landlot_core::framework::DatabaseProcessor;
use uuid::Uuid;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /broadcast/{listing_id}` — manually re-trigger a broadcast.
///
/// Unlike the payment-confirmed trigger this path is unguarded: each
/// call enqueues a fresh fanout and writes a fresh audit record, and
/// brokers may be contacted again. Used to repair a lost or partial
/// broadcast.
pub async fn rebroadcast(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(GetListingById { listing_id })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound)?;

    state
        .broadcast_tx
        .send(BroadcastRequest {
            listing_id,
            trigger: BroadcastTrigger::Manual,
        })
        .await
        .map_err(|_| AdminApiError::EventChannelClosed)?;

    tracing::info!(listing_id = %listing_id, "manual broadcast enqueued");

    Ok(StatusCode::ACCEPTED)
}
