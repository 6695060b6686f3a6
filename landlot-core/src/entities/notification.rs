use crate::entities::NotificationKind;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// One immutable broadcast outcome summary.
///
/// The table is append-only: nothing in this crate issues an UPDATE or
/// DELETE against `notification_audit`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NotificationRecord {
    pub notification_id: Uuid,
    pub listing_id: Uuid,
    pub kind: NotificationKind,
    pub recipients_considered: i32,
    pub sent_count: i32,
    pub failed_count: i32,
    pub created_at: time::OffsetDateTime,
}

/// Append one audit record for a broadcast that ran.
#[derive(Debug, Clone, Copy)]
pub struct InsertNotificationRecord {
    pub listing_id: Uuid,
    pub kind: NotificationKind,
    pub recipients_considered: i32,
    pub sent_count: i32,
    pub failed_count: i32,
}

impl Processor<InsertNotificationRecord> for DatabaseProcessor {
    type Output = NotificationRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertNotificationRecord")]
    async fn process(
        &self,
        msg: InsertNotificationRecord,
    ) -> Result<NotificationRecord, sqlx::Error> {
        sqlx::query_as::<_, NotificationRecord>(
            r#"
            INSERT INTO notification_audit (
                notification_id, listing_id, kind,
                recipients_considered, sent_count, failed_count, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(msg.listing_id)
        .bind(msg.kind)
        .bind(msg.recipients_considered)
        .bind(msg.sent_count)
        .bind(msg.failed_count)
        .fetch_one(&self.pool)
        .await
    }
}

/// List audit records, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListNotificationRecords {
    pub limit: i64,
    pub offset: i64,
}

impl Processor<ListNotificationRecords> for DatabaseProcessor {
    type Output = Vec<NotificationRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListNotificationRecords")]
    async fn process(
        &self,
        msg: ListNotificationRecords,
    ) -> Result<Vec<NotificationRecord>, sqlx::Error> {
        sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT * FROM notification_audit
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(msg.limit)
        .bind(msg.offset)
        .fetch_all(&self.pool)
        .await
    }
}

/// Count audit records.
#[derive(Debug, Clone, Copy)]
pub struct CountNotificationRecords;

impl Processor<CountNotificationRecords> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountNotificationRecords")]
    async fn process(&self, _msg: CountNotificationRecords) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM notification_audit"#)
            .fetch_one(&self.pool)
            .await
    }
}
