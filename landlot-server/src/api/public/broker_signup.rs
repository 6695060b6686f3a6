use axum::{Json, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::broker::{GetBrokerByContactAddress, InsertBroker};
use landlot_core::framework::DatabaseProcessor;
use landlot_core::messaging::whatsapp_address;
use landlot_sdk::objects::broker::{BrokerSignupRequest, BrokerSignupResponse};

use crate::state::AppState;

use super::PublicApiError;

/// `POST /brokers` — register a broker for listing broadcasts.
///
/// Signup is keyed on the normalized contact address: signing up twice
/// with the same phone number returns the existing registration with
/// `already_registered = true` instead of creating a duplicate.
pub async fn broker_signup(
    state: axum::extract::State<AppState>,
    Json(request): Json<BrokerSignupRequest>,
) -> Result<impl IntoResponse, PublicApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let contact_address = whatsapp_address(&request.phone_number);

    if let Some(existing) = processor
        .process(GetBrokerByContactAddress {
            contact_address: contact_address.clone(),
        })
        .await
        .map_err(PublicApiError::Database)?
    {
        return Ok((
            StatusCode::OK,
            Json(BrokerSignupResponse {
                broker_id: existing.broker_id,
                already_registered: true,
            }),
        ));
    }

    let record = processor
        .process(InsertBroker {
            name: request.name,
            agency: request.agency,
            contact_address,
        })
        .await
        .map_err(PublicApiError::Database)?;

    tracing::info!(broker_id = %record.broker_id, "broker registered");

    Ok((
        StatusCode::CREATED,
        Json(BrokerSignupResponse {
            broker_id: record.broker_id,
            already_registered: false,
        }),
    ))
}
