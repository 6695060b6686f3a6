use axum::{Json, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::listing::InsertListing;
use landlot_core::framework::DatabaseProcessor;
use landlot_sdk::objects::listing::{CreateListingRequest, CreateListingResponse};

use crate::state::AppState;

use super::PublicApiError;

/// `POST /listings` — create a listing in `pending_payment`.
///
/// The listing stays invisible to brokers and the public feed until its
/// fee is paid and the activation path flips it to `active`.
pub async fn create_listing(
    state: axum::extract::State<AppState>,
    Json(request): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(InsertListing {
            seller_id: request.seller_id,
            title: request.title,
            location: request.location,
            area: request.area,
            price: request.price,
            description: request.description,
            latitude: request.latitude,
            longitude: request.longitude,
            media_urls: request.media_urls,
        })
        .await
        .map_err(PublicApiError::Database)?;

    tracing::info!(
        listing_id = %record.listing_id,
        seller_id = %record.seller_id,
        "listing created, awaiting payment"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateListingResponse {
            listing_id: record.listing_id,
            status: record.status.into(),
        }),
    ))
}
