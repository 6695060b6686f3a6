//! Landlot Server
//!
//! A land-listing backend: sellers post plots, payment confirmation
//! activates them, and activated listings are fanned out to registered
//! brokers over WhatsApp.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use landlot_core::events::broadcast_request_channel;
use landlot_core::messaging::twilio::TwilioSender;
use landlot_core::payments::PaymentGateway;
use landlot_core::payments::razorpay::RazorpayGateway;
use landlot_core::processors::{ActivationController, BroadcastWorker, Broadcaster};
use landlot_core::stores::{
    BrokerRegistry, ListingStore, NotificationAudit, PgBrokerRegistry, PgListingStore,
    PgNotificationAudit,
};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Landlot - land listing activation and broker broadcast backend
#[derive(Parser, Debug)]
#[command(name = "landlot-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./landlot-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting landlot-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.listen;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    // Build the stores, messaging client, and gateway
    let listings: Arc<dyn ListingStore> = Arc::new(PgListingStore::new(db_pool.clone()));
    let brokers: Arc<dyn BrokerRegistry> = Arc::new(PgBrokerRegistry::new(db_pool.clone()));
    let audit: Arc<dyn NotificationAudit> = Arc::new(PgNotificationAudit::new(db_pool.clone()));
    let sender = Arc::new(TwilioSender::new(loaded_config.twilio.clone()));
    let gateway: Arc<dyn PaymentGateway> =
        Arc::new(RazorpayGateway::new(loaded_config.razorpay.clone()));

    // Spawn the broadcast worker
    let (broadcast_tx, broadcast_rx) = broadcast_request_channel();
    let (worker_shutdown_tx, worker_shutdown_rx) = watch::channel(false);
    let broadcaster = Arc::new(Broadcaster::new(
        listings.clone(),
        brokers,
        audit,
        sender,
        loaded_config.broadcaster.clone(),
    ));
    let worker = BroadcastWorker::new(broadcaster, broadcast_rx, worker_shutdown_rx);
    let worker_handle = tokio::spawn(worker.run());

    let activation = Arc::new(ActivationController::new(listings, broadcast_tx.clone()));

    // Create application state
    let shared_config = loaded_config.into_shared();
    let state = AppState::new(
        db_pool.clone(),
        shared_config,
        broadcast_tx,
        activation,
        gateway,
    );

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();

    // Stop the broadcast worker; in-flight fanouts run to completion
    let _ = worker_shutdown_tx.send(true);
    if let Err(e) = worker_handle.await {
        tracing::error!("Broadcast worker task failed: {}", e);
    }

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
