//! Activation controller.
//!
//! Receives payment-confirmed notifications and drives exactly one
//! activation and one broadcast trigger per listing, no matter how many
//! times the confirmation is delivered or how many deliveries race.
//!
//! The whole mechanism is the conditional transition in the listing
//! store: concurrent confirmations for one listing race on
//! `transition_to_paid`, exactly one observes `true`, and only that call
//! path enqueues the broadcast.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::events::{BroadcastRequest, BroadcastRequestSender, BroadcastTrigger};
use crate::stores::{ListingStore, StoreError};

/// What a confirmation delivery observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// This delivery won the transition; a broadcast was enqueued.
    Activated,
    /// The listing was already paid, or does not exist. Benign no-op.
    AlreadyProcessed,
}

/// Errors from the activation path.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// The listing store is unreachable. Nothing changed; the caller
    /// should re-deliver the confirmation later.
    #[error("listing store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The broadcast channel is closed (server shutting down). The
    /// listing is active but no broadcast was enqueued.
    #[error("broadcast queue closed")]
    QueueClosed,
}

pub struct ActivationController {
    listings: Arc<dyn ListingStore>,
    broadcast_tx: BroadcastRequestSender,
}

impl ActivationController {
    pub fn new(listings: Arc<dyn ListingStore>, broadcast_tx: BroadcastRequestSender) -> Self {
        Self {
            listings,
            broadcast_tx,
        }
    }

    /// Handle one delivery of a payment confirmation for `listing_id`.
    pub async fn confirm_payment(
        &self,
        listing_id: Uuid,
    ) -> Result<ActivationOutcome, ActivationError> {
        if !self.listings.transition_to_paid(listing_id).await? {
            debug!(
                listing_id = %listing_id,
                "payment confirmation ignored: listing already active or unknown"
            );
            return Ok(ActivationOutcome::AlreadyProcessed);
        }

        info!(listing_id = %listing_id, "listing activated");

        self.broadcast_tx
            .send(BroadcastRequest {
                listing_id,
                trigger: BroadcastTrigger::PaymentConfirmed,
            })
            .await
            .map_err(|_| ActivationError::QueueClosed)?;

        Ok(ActivationOutcome::Activated)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{ListingStatus, PaymentState};
    use crate::events::broadcast_request_channel;
    use crate::testing::InMemoryListingStore;

    fn controller() -> (
        Arc<ActivationController>,
        Arc<InMemoryListingStore>,
        crate::events::BroadcastRequestReceiver,
    ) {
        let store = Arc::new(InMemoryListingStore::new());
        let (tx, rx) = broadcast_request_channel();
        let controller = Arc::new(ActivationController::new(store.clone(), tx));
        (controller, store, rx)
    }

    #[tokio::test]
    async fn confirmation_activates_pending_listing() {
        let (controller, store, mut rx) = controller();
        let listing_id = store.insert_pending_listing();

        let outcome = controller.confirm_payment(listing_id).await.unwrap();
        assert_eq!(outcome, ActivationOutcome::Activated);

        let listing = store.get_listing(listing_id).unwrap();
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.payment_status, PaymentState::Paid);

        let request = rx.try_recv().unwrap();
        assert_eq!(request.listing_id, listing_id);
        assert_eq!(request.trigger, BroadcastTrigger::PaymentConfirmed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn duplicate_confirmation_is_a_no_op() {
        let (controller, store, mut rx) = controller();
        let listing_id = store.insert_pending_listing();

        assert_eq!(
            controller.confirm_payment(listing_id).await.unwrap(),
            ActivationOutcome::Activated
        );
        assert_eq!(
            controller.confirm_payment(listing_id).await.unwrap(),
            ActivationOutcome::AlreadyProcessed
        );

        // Exactly one broadcast request was enqueued.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_listing_is_a_no_op() {
        let (controller, _store, mut rx) = controller();

        let outcome = controller.confirm_payment(Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome, ActivationOutcome::AlreadyProcessed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn store_outage_fails_without_side_effects() {
        let (controller, store, mut rx) = controller();
        let listing_id = store.insert_pending_listing();
        store.set_unavailable(true);

        let err = controller.confirm_payment(listing_id).await.unwrap_err();
        assert!(matches!(err, ActivationError::StoreUnavailable(_)));
        assert!(rx.try_recv().is_err());

        // Retrying after the outage is safe and activates normally.
        store.set_unavailable(false);
        assert_eq!(
            controller.confirm_payment(listing_id).await.unwrap(),
            ActivationOutcome::Activated
        );
    }

    #[tokio::test]
    async fn concurrent_confirmations_have_one_winner() {
        let (controller, store, mut rx) = controller();
        let listing_id = store.insert_pending_listing();

        let a = tokio::spawn({
            let controller = controller.clone();
            async move { controller.confirm_payment(listing_id).await }
        });
        let b = tokio::spawn({
            let controller = controller.clone();
            async move { controller.confirm_payment(listing_id).await }
        });

        let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        let winners = outcomes
            .iter()
            .filter(|o| **o == ActivationOutcome::Activated)
            .count();
        assert_eq!(winners, 1);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
