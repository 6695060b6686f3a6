use axum::{Json, extract::Path, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::broker::GetBrokerById;
use landlot_core::entities::listing::ListActiveListings;
use landlot_core::framework::DatabaseProcessor;
use uuid::Uuid;

use crate::state::AppState;

use super::{PublicApiError, listing_to_response};

/// `GET /brokers/{broker_id}/leads` — active listings for a registered
/// broker. The broker id must exist; the lead feed itself is the same
/// active-listing set the broadcast fans out.
pub async fn broker_leads(
    state: axum::extract::State<AppState>,
    Path(broker_id): Path<Uuid>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(GetBrokerById { broker_id })
        .await
        .map_err(PublicApiError::Database)?
        .ok_or(PublicApiError::NotFound)?;

    let records = processor
        .process(ListActiveListings)
        .await
        .map_err(PublicApiError::Database)?;

    let response: Vec<_> = records.iter().map(listing_to_response).collect();
    Ok(Json(response))
}
