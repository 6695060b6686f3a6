//! Broker broadcaster.
//!
//! Given an activated listing, reads the broker registry, dispatches one
//! message per eligible broker, tolerates per-recipient failure, and
//! writes exactly one audit record for the fanout.
//!
//! Ordering on the way out: messages first, then the audit record, then
//! the `broadcast_sent` flag. A crash after the sends but before the
//! audit write loses the audit trail rather than re-contacting brokers on
//! recovery (at-most-once); operators repair through the manual
//! re-trigger path, which accepts duplicate contact.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::entities::NotificationKind;
use crate::entities::broker::BrokerRecord;
use crate::entities::listing::ListingRecord;
use crate::entities::notification::InsertNotificationRecord;
use crate::messaging::{MessageSender, SendError};
use crate::stores::{BrokerRegistry, ListingStore, NotificationAudit, StoreError};

/// Tuning for one fanout.
#[derive(Debug, Clone)]
pub struct BroadcasterConfig {
    /// Upper bound on in-flight dispatches within one fanout.
    pub max_concurrent_sends: usize,
    /// Per-recipient send deadline; expiry counts as a failure.
    pub send_timeout: Duration,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sends: 8,
            send_timeout: Duration::from_secs(15),
        }
    }
}

/// Aggregate tally of one fanout. `sent + failed` always equals
/// `recipients_considered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastCounts {
    pub recipients_considered: u32,
    pub sent: u32,
    pub failed: u32,
}

/// Why a broadcast wrote no audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ListingNotFound,
    NoEligibleBrokers,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ListingNotFound => write!(f, "listing not found"),
            SkipReason::NoEligibleBrokers => write!(f, "no eligible brokers"),
        }
    }
}

/// Outcome of one broadcast invocation.
///
/// A fanout where every recipient failed is still `Completed`; only the
/// early-abort cases are `Skipped`, and only `Completed` fanouts write an
/// audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    Completed(BroadcastCounts),
    Skipped(SkipReason),
}

/// Errors from the broadcast path. Per-recipient dispatch failures are
/// never surfaced here; they land in the failure counter.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
}

pub struct Broadcaster {
    listings: Arc<dyn ListingStore>,
    brokers: Arc<dyn BrokerRegistry>,
    audit: Arc<dyn NotificationAudit>,
    sender: Arc<dyn MessageSender>,
    config: BroadcasterConfig,
}

/// Render the shared message body for one listing. Identical content goes
/// to every recipient.
pub fn render_listing_message(listing: &ListingRecord) -> String {
    format!(
        "New land listed: {title}\n\
         Location: {location}\n\
         Area: {area}\n\
         Price: Rs {price}\n\
         Contact the Landlot desk to connect with the seller.",
        title = listing.title,
        location = listing.location,
        area = listing.area,
        price = listing.price,
    )
}

impl Broadcaster {
    pub fn new(
        listings: Arc<dyn ListingStore>,
        brokers: Arc<dyn BrokerRegistry>,
        audit: Arc<dyn NotificationAudit>,
        sender: Arc<dyn MessageSender>,
        config: BroadcasterConfig,
    ) -> Self {
        Self {
            listings,
            brokers,
            audit,
            sender,
            config,
        }
    }

    /// Fan one listing out to every eligible broker.
    ///
    /// Runs to completion once started; per-recipient outcomes are
    /// independent and a recipient failure never aborts the rest.
    pub async fn broadcast(&self, listing_id: Uuid) -> Result<BroadcastOutcome, BroadcastError> {
        let Some(listing) = self.listings.get(listing_id).await? else {
            warn!(listing_id = %listing_id, "broadcast skipped: listing not found");
            return Ok(BroadcastOutcome::Skipped(SkipReason::ListingNotFound));
        };

        let brokers = self.brokers.list_active().await?;
        if brokers.is_empty() {
            info!(listing_id = %listing_id, "broadcast skipped: no eligible brokers");
            return Ok(BroadcastOutcome::Skipped(SkipReason::NoEligibleBrokers));
        }

        let recipients_considered = brokers.len() as u32;
        let body = render_listing_message(&listing);
        let counts = self
            .dispatch_all(listing_id, brokers, body, recipients_considered)
            .await;

        // One audit record per fanout that ran. A failed write is an
        // operational error only; the messages are already out and must
        // not be re-sent for the sake of the audit trail.
        let audit_record = InsertNotificationRecord {
            listing_id,
            kind: NotificationKind::Broadcast,
            recipients_considered: counts.recipients_considered as i32,
            sent_count: counts.sent as i32,
            failed_count: counts.failed as i32,
        };
        if let Err(e) = self.audit.append(audit_record).await {
            error!(
                listing_id = %listing_id,
                error = %e,
                "failed to write notification audit record"
            );
        }

        // Informational at this point; the activation guard already
        // prevented a second payment-triggered invocation.
        match self.listings.mark_broadcast_sent(listing_id).await {
            Ok(flipped) => debug!(listing_id = %listing_id, flipped, "broadcast flag updated"),
            Err(e) => error!(
                listing_id = %listing_id,
                error = %e,
                "failed to update broadcast flag"
            ),
        }

        info!(
            listing_id = %listing_id,
            recipients = counts.recipients_considered,
            sent = counts.sent,
            failed = counts.failed,
            "listing broadcast complete"
        );

        Ok(BroadcastOutcome::Completed(counts))
    }

    async fn dispatch_all(
        &self,
        listing_id: Uuid,
        brokers: Vec<BrokerRecord>,
        body: String,
        recipients_considered: u32,
    ) -> BroadcastCounts {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sends.max(1)));
        let mut dispatches: JoinSet<bool> = JoinSet::new();

        for broker in brokers {
            let semaphore = Arc::clone(&semaphore);
            let sender = Arc::clone(&self.sender);
            let registry = Arc::clone(&self.brokers);
            let body = body.clone();
            let send_timeout = self.config.send_timeout;

            dispatches.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };

                let result =
                    match tokio::time::timeout(send_timeout, sender.send(&broker.contact_address, &body))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(SendError::TimedOut),
                    };

                match result {
                    Ok(()) => {
                        debug!(broker_id = %broker.broker_id, "broker notified");
                        let now = time::OffsetDateTime::now_utc();
                        if let Err(e) = registry.touch_contacted(broker.broker_id, now).await {
                            warn!(
                                broker_id = %broker.broker_id,
                                error = %e,
                                "failed to record last_contacted"
                            );
                        }
                        true
                    }
                    Err(e) => {
                        warn!(
                            listing_id = %listing_id,
                            broker_id = %broker.broker_id,
                            error = %e,
                            "broker dispatch failed"
                        );
                        false
                    }
                }
            });
        }

        let (mut sent, mut failed) = (0u32, 0u32);
        while let Some(joined) = dispatches.join_next().await {
            match joined {
                Ok(true) => sent += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    error!(listing_id = %listing_id, error = %e, "dispatch task failed to join");
                    failed += 1;
                }
            }
        }

        BroadcastCounts {
            recipients_considered,
            sent,
            failed,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::testing::{
        InMemoryAudit, InMemoryBrokerRegistry, InMemoryListingStore, MockMessageSender,
    };

    struct Harness {
        broadcaster: Broadcaster,
        listings: Arc<InMemoryListingStore>,
        brokers: Arc<InMemoryBrokerRegistry>,
        audit: Arc<InMemoryAudit>,
        sender: Arc<MockMessageSender>,
    }

    fn harness() -> Harness {
        harness_with_config(BroadcasterConfig::default())
    }

    fn harness_with_config(config: BroadcasterConfig) -> Harness {
        let listings = Arc::new(InMemoryListingStore::new());
        let brokers = Arc::new(InMemoryBrokerRegistry::new());
        let audit = Arc::new(InMemoryAudit::new());
        let sender = Arc::new(MockMessageSender::new());
        let broadcaster = Broadcaster::new(
            listings.clone(),
            brokers.clone(),
            audit.clone(),
            sender.clone(),
            config,
        );
        Harness {
            broadcaster,
            listings,
            brokers,
            audit,
            sender,
        }
    }

    fn assert_counts(outcome: BroadcastOutcome, considered: u32, sent: u32, failed: u32) {
        let BroadcastOutcome::Completed(counts) = outcome else {
            panic!("expected Completed, got {outcome:?}");
        };
        assert_eq!(counts.recipients_considered, considered);
        assert_eq!(counts.sent, sent);
        assert_eq!(counts.failed, failed);
        assert_eq!(counts.sent + counts.failed, counts.recipients_considered);
    }

    #[tokio::test]
    async fn fanout_reaches_every_active_broker() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("Asha", "Deshmukh Realty", "whatsapp:+911", true);
        h.brokers.register("Binod", "Hilltop Agents", "whatsapp:+912", true);
        h.brokers.register("Chitra", "Dormant Realty", "whatsapp:+913", false);

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_counts(outcome, 2, 2, 0);

        let sent = h.sender.sent();
        assert_eq!(sent.len(), 2);
        // Inactive brokers are never considered.
        assert!(sent.iter().all(|(to, _)| to != "whatsapp:+913"));
        assert_eq!(h.audit.records().len(), 1);
    }

    #[tokio::test]
    async fn one_recipient_failure_does_not_stop_the_rest() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        let first = h.brokers.register("A", "Agency A", "whatsapp:+911", true);
        let second = h.brokers.register("B", "Agency B", "whatsapp:+912", true);
        let third = h.brokers.register("C", "Agency C", "whatsapp:+913", true);
        h.sender.fail_for("whatsapp:+912");

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_counts(outcome, 3, 2, 1);

        let records = h.audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recipients_considered, 3);
        assert_eq!(records[0].sent_count, 2);
        assert_eq!(records[0].failed_count, 1);
        assert_eq!(records[0].listing_id, listing_id);

        // last_contacted only moves on a successful dispatch.
        assert!(h.brokers.contacted_at(first).is_some());
        assert!(h.brokers.contacted_at(second).is_none());
        assert!(h.brokers.contacted_at(third).is_some());
    }

    #[tokio::test]
    async fn all_failures_still_complete_with_one_audit_record() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);
        h.brokers.register("B", "Agency B", "whatsapp:+912", true);
        h.sender.fail_for("whatsapp:+911");
        h.sender.fail_for("whatsapp:+912");

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_counts(outcome, 2, 0, 2);
        assert_eq!(h.audit.records().len(), 1);
    }

    #[tokio::test]
    async fn no_eligible_brokers_writes_no_audit_record() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("C", "Dormant Realty", "whatsapp:+913", false);

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_eq!(
            outcome,
            BroadcastOutcome::Skipped(SkipReason::NoEligibleBrokers)
        );
        assert!(h.audit.records().is_empty());
        assert!(h.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_listing_skips_without_sending() {
        let h = harness();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);

        let outcome = h.broadcaster.broadcast(Uuid::new_v4()).await.unwrap();
        assert_eq!(
            outcome,
            BroadcastOutcome::Skipped(SkipReason::ListingNotFound)
        );
        assert!(h.audit.records().is_empty());
        assert!(h.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn slow_recipient_counts_as_failure() {
        let h = harness_with_config(BroadcasterConfig {
            max_concurrent_sends: 4,
            send_timeout: Duration::from_millis(50),
        });
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);
        h.brokers.register("B", "Agency B", "whatsapp:+912", true);
        h.sender.delay_for("whatsapp:+912", Duration::from_secs(5));

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_counts(outcome, 2, 1, 1);
    }

    #[tokio::test]
    async fn touch_contacted_failure_never_fails_the_fanout() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        let broker = h.brokers.register("A", "Agency A", "whatsapp:+911", true);
        h.brokers.fail_touches(true);

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_counts(outcome, 1, 1, 0);
        assert!(h.brokers.contacted_at(broker).is_none());
    }

    #[tokio::test]
    async fn audit_write_failure_does_not_resend_or_fail() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);
        h.audit.fail_appends(true);

        let outcome = h.broadcaster.broadcast(listing_id).await.unwrap();
        assert_counts(outcome, 1, 1, 0);
        assert!(h.audit.records().is_empty());
        assert_eq!(h.sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn broadcast_flag_is_set_after_the_fanout() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);

        h.broadcaster.broadcast(listing_id).await.unwrap();
        assert!(h.listings.get_listing(listing_id).unwrap().broadcast_sent);
    }

    #[tokio::test]
    async fn manual_retrigger_produces_a_second_audit_record() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);

        // The manual path is intentionally unguarded: calling twice
        // re-contacts brokers and appends a second record.
        h.broadcaster.broadcast(listing_id).await.unwrap();
        h.broadcaster.broadcast(listing_id).await.unwrap();

        assert_eq!(h.audit.records().len(), 2);
        assert_eq!(h.sender.sent().len(), 2);
    }

    #[tokio::test]
    async fn message_body_carries_the_listing_facts() {
        let h = harness();
        let listing_id = h.listings.insert_active_listing();
        h.brokers.register("A", "Agency A", "whatsapp:+911", true);

        h.broadcaster.broadcast(listing_id).await.unwrap();

        let listing = h.listings.get_listing(listing_id).unwrap();
        let sent = h.sender.sent();
        let body = &sent[0].1;
        assert!(body.contains(&listing.title));
        assert!(body.contains(&listing.location));
        assert!(body.contains(&listing.area));
        assert!(body.contains(&listing.price.to_string()));
    }
}
