//! Processors driving the listing lifecycle:
//!
//! - `ActivationController`: consumes payment confirmations, wins (or
//!   loses) the conditional paid transition, and enqueues at most one
//!   broadcast request per listing.
//! - `Broadcaster`: fans one activated listing out to every eligible
//!   broker and writes one audit record.
//! - `BroadcastWorker`: drains the broadcast request channel.

pub mod activation;
pub mod broadcast_worker;
pub mod broadcaster;

pub use activation::{ActivationController, ActivationError, ActivationOutcome};
pub use broadcast_worker::BroadcastWorker;
pub use broadcaster::{
    BroadcastCounts, BroadcastError, BroadcastOutcome, Broadcaster, BroadcasterConfig, SkipReason,
};
