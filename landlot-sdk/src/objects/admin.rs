//! Admin API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NotificationKind;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatsResponse {
    pub total_listings: i64,
    pub active_listings: i64,
    pub pending_listings: i64,
    pub total_brokers: i64,
    pub active_brokers: i64,
    pub total_notifications: i64,
    pub completed_payments: i64,
}

/// One broadcast audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecordResponse {
    pub notification_id: Uuid,
    pub listing_id: Uuid,
    pub kind: NotificationKind,
    pub recipients_considered: i32,
    pub sent_count: i32,
    pub failed_count: i32,
    pub created_at: i64,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 100_000;

/// Query parameters for listing notification audit records.
#[derive(Debug, Clone, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Clamp limit and offset to safe maximums.
pub fn clamp_pagination(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.clamp(0, MAX_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(clamp_pagination(0, -5), (1, 0));
        assert_eq!(clamp_pagination(50, 100), (50, 100));
        assert_eq!(clamp_pagination(10_000, 9_999_999), (MAX_LIMIT, MAX_OFFSET));
    }
}
