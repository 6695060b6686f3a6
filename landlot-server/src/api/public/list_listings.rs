use axum::{Json, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::listing::ListActiveListings;
use landlot_core::framework::DatabaseProcessor;

use crate::state::AppState;

use super::{PublicApiError, listing_to_response};

/// `GET /listings` — list active listings, newest first.
pub async fn list_listings(
    state: axum::extract::State<AppState>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let records = processor
        .process(ListActiveListings)
        .await
        .map_err(PublicApiError::Database)?;

    let response: Vec<_> = records.iter().map(listing_to_response).collect();
    Ok(Json(response))
}
