use crate::entities::{ListingStatus, PaymentState};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ListingRecord {
    pub listing_id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub location: String,
    pub area: String,
    pub price: Decimal,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub media_urls: Vec<String>,
    pub status: ListingStatus,
    pub payment_status: PaymentState,
    pub broadcast_sent: bool,
    pub created_at: time::OffsetDateTime,
}

/// Insert a new listing in `pending_payment` state.
#[derive(Debug, Clone)]
pub struct InsertListing {
    pub seller_id: Uuid,
    pub title: String,
    pub location: String,
    pub area: String,
    pub price: Decimal,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub media_urls: Vec<String>,
}

impl Processor<InsertListing> for DatabaseProcessor {
    type Output = ListingRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertListing")]
    async fn process(&self, msg: InsertListing) -> Result<ListingRecord, sqlx::Error> {
        sqlx::query_as::<_, ListingRecord>(
            r#"
            INSERT INTO listings (
                listing_id, seller_id, title, location, area, price,
                description, latitude, longitude, media_urls,
                status, payment_status, broadcast_sent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    'pending_payment', 'pending', FALSE, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(msg.seller_id)
        .bind(&msg.title)
        .bind(&msg.location)
        .bind(&msg.area)
        .bind(msg.price)
        .bind(&msg.description)
        .bind(msg.latitude)
        .bind(msg.longitude)
        .bind(&msg.media_urls)
        .fetch_one(&self.pool)
        .await
    }
}

/// Get a listing by id.
#[derive(Debug, Clone, Copy)]
pub struct GetListingById {
    pub listing_id: Uuid,
}

impl Processor<GetListingById> for DatabaseProcessor {
    type Output = Option<ListingRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetListingById")]
    async fn process(&self, msg: GetListingById) -> Result<Option<ListingRecord>, sqlx::Error> {
        sqlx::query_as::<_, ListingRecord>(
            r#"SELECT * FROM listings WHERE listing_id = $1"#,
        )
        .bind(msg.listing_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// List all active listings, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListActiveListings;

impl Processor<ListActiveListings> for DatabaseProcessor {
    type Output = Vec<ListingRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListActiveListings")]
    async fn process(&self, _msg: ListActiveListings) -> Result<Vec<ListingRecord>, sqlx::Error> {
        sqlx::query_as::<_, ListingRecord>(
            r#"
            SELECT * FROM listings
            WHERE status = 'active'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// List one seller's listings, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListListingsBySeller {
    pub seller_id: Uuid,
}

impl Processor<ListListingsBySeller> for DatabaseProcessor {
    type Output = Vec<ListingRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListListingsBySeller")]
    async fn process(&self, msg: ListListingsBySeller) -> Result<Vec<ListingRecord>, sqlx::Error> {
        sqlx::query_as::<_, ListingRecord>(
            r#"
            SELECT * FROM listings
            WHERE seller_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(msg.seller_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Conditionally flip a listing to paid/active.
///
/// The `WHERE payment_status = 'pending'` clause makes this a single
/// compare-and-set: of any number of concurrent or repeated payment
/// confirmations for the same listing, exactly one update takes effect.
#[derive(Debug, Clone, Copy)]
pub struct TransitionListingToPaid {
    pub listing_id: Uuid,
}

impl Processor<TransitionListingToPaid> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:TransitionListingToPaid")]
    async fn process(&self, msg: TransitionListingToPaid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET payment_status = 'paid', status = 'active'
            WHERE listing_id = $1 AND payment_status = 'pending'
            "#,
        )
        .bind(msg.listing_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// Conditionally flip `broadcast_sent` from false to true.
#[derive(Debug, Clone, Copy)]
pub struct MarkBroadcastSent {
    pub listing_id: Uuid,
}

impl Processor<MarkBroadcastSent> for DatabaseProcessor {
    type Output = bool;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkBroadcastSent")]
    async fn process(&self, msg: MarkBroadcastSent) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET broadcast_sent = TRUE
            WHERE listing_id = $1 AND broadcast_sent = FALSE
            "#,
        )
        .bind(msg.listing_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// Count listings, optionally filtered by status.
#[derive(Debug, Clone, Copy)]
pub struct CountListings {
    pub status: Option<ListingStatus>,
}

impl Processor<CountListings> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountListings")]
    async fn process(&self, msg: CountListings) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM listings
            WHERE $1::listing_status IS NULL OR status = $1
            "#,
        )
        .bind(msg.status)
        .fetch_one(&self.pool)
        .await
    }
}
