use axum::{Json, extract::Path, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::listing::ListListingsBySeller;
use landlot_core::framework::DatabaseProcessor;
use uuid::Uuid;

use crate::state::AppState;

use super::{PublicApiError, listing_to_response};

/// `GET /sellers/{seller_id}/listings` — one seller's listings, newest
/// first, in every state (sellers see their own pending listings).
pub async fn seller_listings(
    state: axum::extract::State<AppState>,
    Path(seller_id): Path<Uuid>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let records = processor
        .process(ListListingsBySeller { seller_id })
        .await
        .map_err(PublicApiError::Database)?;

    let response: Vec<_> = records.iter().map(listing_to_response).collect();
    Ok(Json(response))
}
