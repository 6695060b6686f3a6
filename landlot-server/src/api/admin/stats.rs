use axum::{Json, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::ListingStatus;
use landlot_core::entities::broker::CountBrokers;
use landlot_core::entities::listing::CountListings;
use landlot_core::entities::notification::CountNotificationRecords;
use landlot_core::entities::payment_order::CountCompletedPaymentOrders;
use landlot_core::framework::DatabaseProcessor;
use landlot_sdk::objects::admin::AdminStatsResponse;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `GET /admin/stats` — aggregate counters for the dashboard.
pub async fn stats(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let total_listings = processor
        .process(CountListings { status: None })
        .await
        .map_err(AdminApiError::Database)?;
    let active_listings = processor
        .process(CountListings {
            status: Some(ListingStatus::Active),
        })
        .await
        .map_err(AdminApiError::Database)?;
    let pending_listings = processor
        .process(CountListings {
            status: Some(ListingStatus::PendingPayment),
        })
        .await
        .map_err(AdminApiError::Database)?;
    let total_brokers = processor
        .process(CountBrokers { active_only: false })
        .await
        .map_err(AdminApiError::Database)?;
    let active_brokers = processor
        .process(CountBrokers { active_only: true })
        .await
        .map_err(AdminApiError::Database)?;
    let total_notifications = processor
        .process(CountNotificationRecords)
        .await
        .map_err(AdminApiError::Database)?;
    let completed_payments = processor
        .process(CountCompletedPaymentOrders)
        .await
        .map_err(AdminApiError::Database)?;

    Ok(Json(AdminStatsResponse {
        total_listings,
        active_listings,
        pending_listings,
        total_brokers,
        active_brokers,
        total_notifications,
        completed_payments,
    }))
}
