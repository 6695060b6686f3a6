//! Public API handlers.
//!
//! These endpoints serve the seller/broker frontend and the payment
//! gateway's checkout callback. They are unauthenticated.
//!
//! # Endpoints
//!
//! - `POST /listings`                        – create a listing (pending payment)
//! - `GET  /listings`                        – list active listings
//! - `GET  /sellers/{seller_id}/listings`    – list one seller's listings
//! - `POST /brokers`                         – broker signup (idempotent per phone)
//! - `GET  /brokers/{broker_id}/leads`       – active listings for a broker
//! - `POST /payments/order`                  – create a gateway order for a listing
//! - `POST /payments/verify`                 – verify checkout callback, activate listing

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use landlot_core::entities::listing::ListingRecord;
use landlot_core::payments::GatewayError;
use landlot_core::processors::ActivationError;
use landlot_sdk::objects::listing::ListingResponse;

use crate::state::AppState;

mod broker_leads;
mod broker_signup;
mod create_listing;
mod create_order;
mod list_listings;
mod seller_listings;
mod verify_payment;

/// Build the public API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/listings",
            post(create_listing::create_listing).get(list_listings::list_listings),
        )
        .route(
            "/sellers/{seller_id}/listings",
            get(seller_listings::seller_listings),
        )
        .route("/brokers", post(broker_signup::broker_signup))
        .route(
            "/brokers/{broker_id}/leads",
            get(broker_leads::broker_leads),
        )
        .route("/payments/order", post(create_order::create_order))
        .route("/payments/verify", post(verify_payment::verify_payment))
}

/// Convert a `ListingRecord` (DB model) into a `ListingResponse` (API model).
fn listing_to_response(record: &ListingRecord) -> ListingResponse {
    ListingResponse {
        listing_id: record.listing_id,
        seller_id: record.seller_id,
        title: record.title.clone(),
        location: record.location.clone(),
        area: record.area.clone(),
        price: record.price,
        description: record.description.clone(),
        latitude: record.latitude,
        longitude: record.longitude,
        media_urls: record.media_urls.clone(),
        status: record.status.into(),
        payment_status: record.payment_status.into(),
        broadcast_sent: record.broadcast_sent,
        created_at: record.created_at.unix_timestamp(),
    }
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in public API handlers.
#[derive(Debug)]
enum PublicApiError {
    /// A database query failed.
    Database(sqlx::Error),
    /// The referenced listing or broker was not found.
    NotFound,
    /// The listing's fee was already paid; no second order is needed.
    AlreadyPaid,
    /// The requested order amount is non-positive or out of range.
    InvalidAmount,
    /// The payment gateway rejected the order creation.
    Gateway(GatewayError),
    /// The checkout callback signature did not verify.
    InvalidSignature,
    /// The listing store was unreachable; the caller may retry.
    StoreUnavailable,
    /// The broadcast queue is closed (server shutting down).
    QueueClosed,
}

impl From<ActivationError> for PublicApiError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::StoreUnavailable(_) => Self::StoreUnavailable,
            ActivationError::QueueClosed => Self::QueueClosed,
        }
    }
}

impl IntoResponse for PublicApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            PublicApiError::Database(e) => {
                tracing::error!(error = %e, "Public API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            PublicApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
            PublicApiError::AlreadyPaid => {
                (StatusCode::CONFLICT, "listing fee already paid").into_response()
            }
            PublicApiError::InvalidAmount => {
                (StatusCode::BAD_REQUEST, "invalid order amount").into_response()
            }
            PublicApiError::Gateway(e) => {
                tracing::error!(error = %e, "Payment gateway error");
                (StatusCode::BAD_GATEWAY, "payment gateway unavailable").into_response()
            }
            PublicApiError::InvalidSignature => {
                (StatusCode::BAD_REQUEST, "payment signature verification failed").into_response()
            }
            PublicApiError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store unavailable, retry later",
            )
                .into_response(),
            PublicApiError::QueueClosed => {
                tracing::error!("Public API: broadcast queue closed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
