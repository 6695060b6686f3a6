//! Store trait seams for the activation and broadcast paths.
//!
//! The traits cover exactly the operations those paths need; everything
//! else (inserts, list endpoints, counters) talks to the processors in
//! [`crate::entities`] directly. Postgres implementations delegate to the
//! same processors, and [`crate::testing`] provides in-memory doubles.

use async_trait::async_trait;
use kanau::processor::Processor;
use uuid::Uuid;

use crate::entities::broker::{BrokerRecord, ListActiveBrokers, TouchBrokerContacted};
use crate::entities::listing::{
    GetListingById, ListingRecord, MarkBroadcastSent, TransitionListingToPaid,
};
use crate::entities::notification::{InsertNotificationRecord, NotificationRecord};
use crate::framework::DatabaseProcessor;

/// Errors surfaced by the durable stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying store could not be reached; retrying is safe.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Durable listing state, including the two conditional transitions.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn get(&self, listing_id: Uuid) -> Result<Option<ListingRecord>, StoreError>;

    /// Atomically set `payment_status = paid, status = active` iff the
    /// listing is still pending. Returns whether the transition happened.
    async fn transition_to_paid(&self, listing_id: Uuid) -> Result<bool, StoreError>;

    /// Atomically flip `broadcast_sent` false -> true. Returns whether it
    /// flipped.
    async fn mark_broadcast_sent(&self, listing_id: Uuid) -> Result<bool, StoreError>;
}

/// Durable broker registry.
#[async_trait]
pub trait BrokerRegistry: Send + Sync {
    async fn list_active(&self) -> Result<Vec<BrokerRecord>, StoreError>;

    /// Record a successful dispatch. Callers treat failures as best-effort.
    async fn touch_contacted(
        &self,
        broker_id: Uuid,
        at: time::OffsetDateTime,
    ) -> Result<(), StoreError>;
}

/// Append-only broadcast audit log.
#[async_trait]
pub trait NotificationAudit: Send + Sync {
    async fn append(
        &self,
        record: InsertNotificationRecord,
    ) -> Result<NotificationRecord, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres implementations
// ---------------------------------------------------------------------------

pub struct PgListingStore {
    processor: DatabaseProcessor,
}

impl PgListingStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn get(&self, listing_id: Uuid) -> Result<Option<ListingRecord>, StoreError> {
        Ok(self.processor.process(GetListingById { listing_id }).await?)
    }

    async fn transition_to_paid(&self, listing_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .processor
            .process(TransitionListingToPaid { listing_id })
            .await?)
    }

    async fn mark_broadcast_sent(&self, listing_id: Uuid) -> Result<bool, StoreError> {
        Ok(self
            .processor
            .process(MarkBroadcastSent { listing_id })
            .await?)
    }
}

pub struct PgBrokerRegistry {
    processor: DatabaseProcessor,
}

impl PgBrokerRegistry {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl BrokerRegistry for PgBrokerRegistry {
    async fn list_active(&self) -> Result<Vec<BrokerRecord>, StoreError> {
        Ok(self.processor.process(ListActiveBrokers).await?)
    }

    async fn touch_contacted(
        &self,
        broker_id: Uuid,
        at: time::OffsetDateTime,
    ) -> Result<(), StoreError> {
        Ok(self
            .processor
            .process(TouchBrokerContacted { broker_id, at })
            .await?)
    }
}

pub struct PgNotificationAudit {
    processor: DatabaseProcessor,
}

impl PgNotificationAudit {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl NotificationAudit for PgNotificationAudit {
    async fn append(
        &self,
        record: InsertNotificationRecord,
    ) -> Result<NotificationRecord, StoreError> {
        Ok(self.processor.process(record).await?)
    }
}
