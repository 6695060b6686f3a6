//! Application state shared across all request handlers.

use crate::config::SharedConfig;
use landlot_core::events::BroadcastRequestSender;
use landlot_core::payments::PaymentGateway;
use landlot_core::processors::ActivationController;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Reloadable configuration sections (updated via SIGHUP).
    pub config: SharedConfig,
    /// Queue feeding the broadcast worker; used by the manual re-trigger.
    pub broadcast_tx: BroadcastRequestSender,
    /// Drives the paid transition and enqueues the activation broadcast.
    pub activation: Arc<ActivationController>,
    /// Payment gateway client for order creation and signature checks.
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        config: SharedConfig,
        broadcast_tx: BroadcastRequestSender,
        activation: Arc<ActivationController>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            config,
            broadcast_tx,
            activation,
            gateway,
        }
    }
}
