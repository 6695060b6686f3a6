//! Broadcast request channel.
//!
//! Requests are ephemeral and carry only the listing identifier; the
//! worker re-fetches current state from the database. The payment path
//! enqueues a request only on the confirmation that won the conditional
//! state transition, so at most one `PaymentConfirmed` request exists per
//! listing. `Manual` requests bypass that guard on purpose.

use tokio::sync::mpsc;
use uuid::Uuid;

/// Default buffer size for the broadcast request channel.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// What caused a broadcast to be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastTrigger {
    /// The listing's payment was just confirmed (guarded, once per listing).
    PaymentConfirmed,
    /// Operator re-trigger (unguarded, may repeat).
    Manual,
}

impl std::fmt::Display for BroadcastTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BroadcastTrigger::PaymentConfirmed => write!(f, "payment_confirmed"),
            BroadcastTrigger::Manual => write!(f, "manual"),
        }
    }
}

/// One request to fan a listing out to the broker registry.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastRequest {
    pub listing_id: Uuid,
    pub trigger: BroadcastTrigger,
}

/// Sender handle for broadcast requests.
pub type BroadcastRequestSender = mpsc::Sender<BroadcastRequest>;
/// Receiver handle for broadcast requests.
pub type BroadcastRequestReceiver = mpsc::Receiver<BroadcastRequest>;

/// Create a new broadcast request channel.
pub fn broadcast_request_channel() -> (BroadcastRequestSender, BroadcastRequestReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
