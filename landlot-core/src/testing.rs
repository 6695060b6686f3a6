//! In-memory implementations of the store and messaging seams.
//!
//! These back the unit tests for the activation and broadcast paths and
//! faithfully mirror the conditional-update semantics of the SQL layer.
//! They live outside `#[cfg(test)]` so downstream crates can reuse them.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::entities::broker::BrokerRecord;
use crate::entities::listing::ListingRecord;
use crate::entities::notification::{InsertNotificationRecord, NotificationRecord};
use crate::entities::{ListingStatus, PaymentState};
use crate::messaging::{MessageSender, SendError};
use crate::stores::{BrokerRegistry, ListingStore, NotificationAudit, StoreError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable() -> StoreError {
    StoreError::Unavailable(sqlx::Error::PoolClosed)
}

// ---------------------------------------------------------------------------
// Listing store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryListingStore {
    listings: Mutex<HashMap<Uuid, ListingRecord>>,
    offline: AtomicBool,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store being unreachable.
    pub fn set_unavailable(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert a listing awaiting payment and return its id.
    pub fn insert_pending_listing(&self) -> Uuid {
        self.insert_listing(ListingStatus::PendingPayment, PaymentState::Pending)
    }

    /// Insert an already-activated listing and return its id.
    pub fn insert_active_listing(&self) -> Uuid {
        self.insert_listing(ListingStatus::Active, PaymentState::Paid)
    }

    fn insert_listing(&self, status: ListingStatus, payment_status: PaymentState) -> Uuid {
        let listing_id = Uuid::new_v4();
        let record = ListingRecord {
            listing_id,
            seller_id: Uuid::new_v4(),
            title: "Two-acre plot near the lake".to_string(),
            location: "Karjat, Maharashtra".to_string(),
            area: "2 acres".to_string(),
            price: Decimal::new(4_500_000, 0),
            description: "Level plot with road access.".to_string(),
            latitude: Some(18.91),
            longitude: Some(73.32),
            media_urls: vec!["/media/plot-front.jpg".to_string()],
            status,
            payment_status,
            broadcast_sent: false,
            created_at: time::OffsetDateTime::now_utc(),
        };
        lock(&self.listings).insert(listing_id, record);
        listing_id
    }

    /// Direct read for assertions, bypassing the trait.
    pub fn get_listing(&self, listing_id: Uuid) -> Option<ListingRecord> {
        lock(&self.listings).get(&listing_id).cloned()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn get(&self, listing_id: Uuid) -> Result<Option<ListingRecord>, StoreError> {
        self.check_online()?;
        Ok(lock(&self.listings).get(&listing_id).cloned())
    }

    async fn transition_to_paid(&self, listing_id: Uuid) -> Result<bool, StoreError> {
        self.check_online()?;
        // Single guard held across check and write, like the conditional
        // UPDATE it stands in for.
        let mut listings = lock(&self.listings);
        match listings.get_mut(&listing_id) {
            Some(listing) if listing.payment_status == PaymentState::Pending => {
                listing.payment_status = PaymentState::Paid;
                listing.status = ListingStatus::Active;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_broadcast_sent(&self, listing_id: Uuid) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut listings = lock(&self.listings);
        match listings.get_mut(&listing_id) {
            Some(listing) if !listing.broadcast_sent => {
                listing.broadcast_sent = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Broker registry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryBrokerRegistry {
    brokers: Mutex<Vec<BrokerRecord>>,
    touch_failures: AtomicBool,
}

impl InMemoryBrokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a broker and return its id.
    pub fn register(&self, name: &str, agency: &str, contact_address: &str, active: bool) -> Uuid {
        let broker_id = Uuid::new_v4();
        lock(&self.brokers).push(BrokerRecord {
            broker_id,
            name: name.to_string(),
            agency: agency.to_string(),
            contact_address: contact_address.to_string(),
            active,
            last_contacted: None,
            created_at: time::OffsetDateTime::now_utc(),
        });
        broker_id
    }

    /// Make every `touch_contacted` call fail.
    pub fn fail_touches(&self, fail: bool) {
        self.touch_failures.store(fail, Ordering::SeqCst);
    }

    /// Direct read of a broker's `last_contacted` for assertions.
    pub fn contacted_at(&self, broker_id: Uuid) -> Option<time::OffsetDateTime> {
        lock(&self.brokers)
            .iter()
            .find(|b| b.broker_id == broker_id)
            .and_then(|b| b.last_contacted)
    }
}

#[async_trait]
impl BrokerRegistry for InMemoryBrokerRegistry {
    async fn list_active(&self) -> Result<Vec<BrokerRecord>, StoreError> {
        Ok(lock(&self.brokers)
            .iter()
            .filter(|b| b.active)
            .cloned()
            .collect())
    }

    async fn touch_contacted(
        &self,
        broker_id: Uuid,
        at: time::OffsetDateTime,
    ) -> Result<(), StoreError> {
        if self.touch_failures.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut brokers = lock(&self.brokers);
        if let Some(broker) = brokers.iter_mut().find(|b| b.broker_id == broker_id) {
            broker.last_contacted = Some(at);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notification audit
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryAudit {
    records: Mutex<Vec<NotificationRecord>>,
    append_failures: AtomicBool,
}

impl InMemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `append` call fail.
    pub fn fail_appends(&self, fail: bool) {
        self.append_failures.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the appended records.
    pub fn records(&self) -> Vec<NotificationRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl NotificationAudit for InMemoryAudit {
    async fn append(
        &self,
        record: InsertNotificationRecord,
    ) -> Result<NotificationRecord, StoreError> {
        if self.append_failures.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let stored = NotificationRecord {
            notification_id: Uuid::new_v4(),
            listing_id: record.listing_id,
            kind: record.kind,
            recipients_considered: record.recipients_considered,
            sent_count: record.sent_count,
            failed_count: record.failed_count,
            created_at: time::OffsetDateTime::now_utc(),
        };
        lock(&self.records).push(stored.clone());
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Message sender
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockMessageSender {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl MockMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a rejection for one address.
    pub fn fail_for(&self, address: &str) {
        lock(&self.failing).insert(address.to_string());
    }

    /// Script a delivery delay for one address.
    pub fn delay_for(&self, address: &str, delay: Duration) {
        lock(&self.delays).insert(address.to_string(), delay);
    }

    /// Snapshot of `(to, body)` pairs that were accepted.
    pub fn sent(&self) -> Vec<(String, String)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MessageSender for MockMessageSender {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        let delay = lock(&self.delays).get(to).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing).contains(to) {
            return Err(SendError::Rejected {
                status: 400,
                body: "scripted failure".to_string(),
            });
        }
        lock(&self.sent).push((to.to_string(), body.to_string()));
        Ok(())
    }
}
