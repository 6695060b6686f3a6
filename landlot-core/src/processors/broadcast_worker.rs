//! Broadcast worker.
//!
//! Drains the broadcast request channel and runs one fanout per request.
//! Requests already in flight run to completion; shutdown only stops the
//! worker from picking up new ones.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::events::BroadcastRequestReceiver;
use crate::processors::broadcaster::{BroadcastOutcome, Broadcaster};

pub struct BroadcastWorker {
    broadcaster: Arc<Broadcaster>,
    request_rx: BroadcastRequestReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl BroadcastWorker {
    pub fn new(
        broadcaster: Arc<Broadcaster>,
        request_rx: BroadcastRequestReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            broadcaster,
            request_rx,
            shutdown_rx,
        }
    }

    /// Run the worker until shutdown or channel closure.
    pub async fn run(mut self) {
        info!("BroadcastWorker started");

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown_rx.changed() => {
                    // A dropped sender counts as shutdown; otherwise the
                    // biased arm would fire on every poll.
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("BroadcastWorker received shutdown signal");
                        break;
                    }
                }

                Some(request) = self.request_rx.recv() => {
                    debug!(
                        listing_id = %request.listing_id,
                        trigger = %request.trigger,
                        "received broadcast request"
                    );

                    match self.broadcaster.broadcast(request.listing_id).await {
                        Ok(BroadcastOutcome::Completed(_)) => {}
                        Ok(BroadcastOutcome::Skipped(reason)) => {
                            debug!(
                                listing_id = %request.listing_id,
                                trigger = %request.trigger,
                                %reason,
                                "broadcast skipped"
                            );
                        }
                        Err(e) => {
                            error!(
                                listing_id = %request.listing_id,
                                trigger = %request.trigger,
                                error = %e,
                                "broadcast failed"
                            );
                        }
                    }
                }

                else => {
                    info!("broadcast request channel closed");
                    break;
                }
            }
        }

        info!("BroadcastWorker shutdown complete");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::{BroadcastRequest, BroadcastTrigger, broadcast_request_channel};
    use crate::processors::broadcaster::BroadcasterConfig;
    use crate::testing::{
        InMemoryAudit, InMemoryBrokerRegistry, InMemoryListingStore, MockMessageSender,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn worker_drains_requests_and_stops_on_shutdown() {
        let listings = Arc::new(InMemoryListingStore::new());
        let brokers = Arc::new(InMemoryBrokerRegistry::new());
        let audit = Arc::new(InMemoryAudit::new());
        let sender = Arc::new(MockMessageSender::new());
        let broadcaster = Arc::new(Broadcaster::new(
            listings.clone(),
            brokers.clone(),
            audit.clone(),
            sender,
            BroadcasterConfig::default(),
        ));

        let listing_id = listings.insert_active_listing();
        brokers.register("A", "Agency A", "whatsapp:+911", true);

        let (request_tx, request_rx) = broadcast_request_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(BroadcastWorker::new(broadcaster, request_rx, shutdown_rx).run());

        request_tx
            .send(BroadcastRequest {
                listing_id,
                trigger: BroadcastTrigger::PaymentConfirmed,
            })
            .await
            .unwrap();
        request_tx
            .send(BroadcastRequest {
                listing_id,
                trigger: BroadcastTrigger::Manual,
            })
            .await
            .unwrap();

        // Wait for both fanouts to land in the audit log.
        for _ in 0..100 {
            if audit.records().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(audit.records().len(), 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn worker_stops_when_shutdown_sender_is_dropped() {
        let broadcaster = Arc::new(Broadcaster::new(
            Arc::new(InMemoryListingStore::new()),
            Arc::new(InMemoryBrokerRegistry::new()),
            Arc::new(InMemoryAudit::new()),
            Arc::new(MockMessageSender::new()),
            BroadcasterConfig::default(),
        ));

        // Keep the request sender alive so only the watch channel ends.
        let (_request_tx, request_rx) = broadcast_request_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(BroadcastWorker::new(broadcaster, request_rx, shutdown_rx).run());

        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
