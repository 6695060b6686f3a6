use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct BrokerRecord {
    pub broker_id: Uuid,
    pub name: String,
    pub agency: String,
    /// Messaging-channel-qualified address, e.g. `whatsapp:+9198...`.
    pub contact_address: String,
    pub active: bool,
    pub last_contacted: Option<time::OffsetDateTime>,
    pub created_at: time::OffsetDateTime,
}

/// Register a new broker (active by default).
#[derive(Debug, Clone)]
pub struct InsertBroker {
    pub name: String,
    pub agency: String,
    pub contact_address: String,
}

impl Processor<InsertBroker> for DatabaseProcessor {
    type Output = BrokerRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertBroker")]
    async fn process(&self, msg: InsertBroker) -> Result<BrokerRecord, sqlx::Error> {
        sqlx::query_as::<_, BrokerRecord>(
            r#"
            INSERT INTO brokers (broker_id, name, agency, contact_address, active, created_at)
            VALUES ($1, $2, $3, $4, TRUE, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&msg.name)
        .bind(&msg.agency)
        .bind(&msg.contact_address)
        .fetch_one(&self.pool)
        .await
    }
}

/// Get a broker by id.
#[derive(Debug, Clone, Copy)]
pub struct GetBrokerById {
    pub broker_id: Uuid,
}

impl Processor<GetBrokerById> for DatabaseProcessor {
    type Output = Option<BrokerRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetBrokerById")]
    async fn process(&self, msg: GetBrokerById) -> Result<Option<BrokerRecord>, sqlx::Error> {
        sqlx::query_as::<_, BrokerRecord>(r#"SELECT * FROM brokers WHERE broker_id = $1"#)
            .bind(msg.broker_id)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Look up a broker by its contact address (signup dedup).
#[derive(Debug, Clone)]
pub struct GetBrokerByContactAddress {
    pub contact_address: String,
}

impl Processor<GetBrokerByContactAddress> for DatabaseProcessor {
    type Output = Option<BrokerRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetBrokerByContactAddress")]
    async fn process(
        &self,
        msg: GetBrokerByContactAddress,
    ) -> Result<Option<BrokerRecord>, sqlx::Error> {
        sqlx::query_as::<_, BrokerRecord>(r#"SELECT * FROM brokers WHERE contact_address = $1"#)
            .bind(&msg.contact_address)
            .fetch_optional(&self.pool)
            .await
    }
}

/// List all brokers eligible for broadcast.
#[derive(Debug, Clone, Copy)]
pub struct ListActiveBrokers;

impl Processor<ListActiveBrokers> for DatabaseProcessor {
    type Output = Vec<BrokerRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListActiveBrokers")]
    async fn process(&self, _msg: ListActiveBrokers) -> Result<Vec<BrokerRecord>, sqlx::Error> {
        sqlx::query_as::<_, BrokerRecord>(
            r#"
            SELECT * FROM brokers
            WHERE active = TRUE
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

/// Record a successful dispatch to a broker.
#[derive(Debug, Clone, Copy)]
pub struct TouchBrokerContacted {
    pub broker_id: Uuid,
    pub at: time::OffsetDateTime,
}

impl Processor<TouchBrokerContacted> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:TouchBrokerContacted")]
    async fn process(&self, msg: TouchBrokerContacted) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE brokers SET last_contacted = $2 WHERE broker_id = $1"#)
            .bind(msg.broker_id)
            .bind(msg.at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Count brokers, optionally only the active ones.
#[derive(Debug, Clone, Copy)]
pub struct CountBrokers {
    pub active_only: bool,
}

impl Processor<CountBrokers> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountBrokers")]
    async fn process(&self, msg: CountBrokers) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM brokers WHERE active = TRUE OR $1 = FALSE"#,
        )
        .bind(msg.active_only)
        .fetch_one(&self.pool)
        .await
    }
}
