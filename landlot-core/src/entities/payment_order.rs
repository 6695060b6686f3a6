use crate::entities::PaymentOrderStatus;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PaymentOrderRecord {
    pub order_id: Uuid,
    pub provider_order_id: String,
    pub listing_id: Uuid,
    pub amount_paise: i64,
    pub currency: String,
    pub status: PaymentOrderStatus,
    pub provider_payment_id: Option<String>,
    pub created_at: time::OffsetDateTime,
    pub completed_at: Option<time::OffsetDateTime>,
}

/// Record a freshly created gateway order for a listing.
#[derive(Debug, Clone)]
pub struct InsertPaymentOrder {
    pub provider_order_id: String,
    pub listing_id: Uuid,
    pub amount_paise: i64,
    pub currency: String,
}

impl Processor<InsertPaymentOrder> for DatabaseProcessor {
    type Output = PaymentOrderRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertPaymentOrder")]
    async fn process(&self, msg: InsertPaymentOrder) -> Result<PaymentOrderRecord, sqlx::Error> {
        sqlx::query_as::<_, PaymentOrderRecord>(
            r#"
            INSERT INTO payment_orders (
                order_id, provider_order_id, listing_id,
                amount_paise, currency, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, 'created', now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&msg.provider_order_id)
        .bind(msg.listing_id)
        .bind(msg.amount_paise)
        .bind(&msg.currency)
        .fetch_one(&self.pool)
        .await
    }
}

/// Look up a payment order by the gateway's order id.
#[derive(Debug, Clone)]
pub struct GetPaymentOrderByProviderId {
    pub provider_order_id: String,
}

impl Processor<GetPaymentOrderByProviderId> for DatabaseProcessor {
    type Output = Option<PaymentOrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentOrderByProviderId")]
    async fn process(
        &self,
        msg: GetPaymentOrderByProviderId,
    ) -> Result<Option<PaymentOrderRecord>, sqlx::Error> {
        sqlx::query_as::<_, PaymentOrderRecord>(
            r#"SELECT * FROM payment_orders WHERE provider_order_id = $1"#,
        )
        .bind(&msg.provider_order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Conditionally complete a payment order.
///
/// Returns false when the order was already completed by an earlier
/// delivery of the same confirmation.
#[derive(Debug, Clone)]
pub struct CompletePaymentOrder {
    pub provider_order_id: String,
    pub provider_payment_id: String,
}

impl Processor<CompletePaymentOrder> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CompletePaymentOrder")]
    async fn process(&self, msg: CompletePaymentOrder) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = 'completed', provider_payment_id = $2, completed_at = now()
            WHERE provider_order_id = $1 AND status = 'created'
            "#,
        )
        .bind(&msg.provider_order_id)
        .bind(&msg.provider_payment_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// Count completed payment orders.
#[derive(Debug, Clone, Copy)]
pub struct CountCompletedPaymentOrders;

impl Processor<CountCompletedPaymentOrders> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountCompletedPaymentOrders")]
    async fn process(&self, _msg: CountCompletedPaymentOrders) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM payment_orders WHERE status = 'completed'"#,
        )
        .fetch_one(&self.pool)
        .await
    }
}
