//! Admin API handlers.
//!
//! These endpoints are called by the admin dashboard and require the
//! `X-Landlot-Admin` header with the plaintext admin secret.
//!
//! # Endpoints
//!
//! - `GET  /admin/stats`             – aggregate counters
//! - `GET  /admin/notifications`     – broadcast audit records (paginated)
//! - `POST /broadcast/{listing_id}`  – manually re-trigger a broadcast

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::state::AppState;

mod list_notifications;
mod rebroadcast;
mod stats;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats::stats))
        .route(
            "/admin/notifications",
            get(list_notifications::list_notifications),
        )
        .route("/broadcast/{listing_id}", post(rebroadcast::rebroadcast))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Database(sqlx::Error),
    NotFound,
    EventChannelClosed,
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
            AdminApiError::EventChannelClosed => {
                tracing::error!("Admin API: broadcast request channel closed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

use landlot_core::entities::notification::NotificationRecord;
use landlot_sdk::objects::admin::NotificationRecordResponse;

pub(crate) fn notification_to_response(r: &NotificationRecord) -> NotificationRecordResponse {
    NotificationRecordResponse {
        notification_id: r.notification_id,
        listing_id: r.listing_id,
        kind: r.kind.into(),
        recipients_considered: r.recipients_considered,
        sent_count: r.sent_count,
        failed_count: r.failed_count,
        created_at: r.created_at.unix_timestamp(),
    }
}
