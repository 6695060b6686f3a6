use axum::{Json, extract::Query, response::IntoResponse};
use kanau::processor::Processor;
use landlot_core::entities::notification::ListNotificationRecords;
use landlot_core::framework::DatabaseProcessor;
use landlot_sdk::objects::admin::{ListNotificationsQuery, clamp_pagination};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, notification_to_response};

/// `GET /admin/notifications` — broadcast audit records, newest first.
pub async fn list_notifications(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let records = processor
        .process(ListNotificationRecords { limit, offset })
        .await
        .map_err(AdminApiError::Database)?;

    let response: Vec<_> = records.iter().map(notification_to_response).collect();
    Ok(Json(response))
}
