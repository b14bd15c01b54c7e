//! Chat Presence Server Library
//!
//! Participants register a display name, exchange broadcast or private
//! messages, and keep themselves alive with status pings; a recurring sweep
//! evicts anyone whose heartbeat goes stale and announces the departure.

pub mod config;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod presence;
pub mod sanitize;
pub mod store;
pub mod sweeper;
pub mod validate;
pub mod visibility;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{AppState, ChatServerConfig};
use handlers::{
    // Messages
    delete_message, edit_message, list_messages, post_message,
    // Participants
    join, list_participants,
    // Heartbeat
    heartbeat,
};
use messages::MessageStore;
use presence::PresenceStore;
use store::JsonDocStore;

/// Builds the full route table over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // Participant endpoints
        .route("/participants", get(list_participants).post(join))
        // Message endpoints
        .route("/messages", get(list_messages).post(post_message))
        .route("/messages/{id}", put(edit_message).delete(delete_message))
        // Heartbeat
        .route("/status", post(heartbeat))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== Chat Presence Server ===");
    info!("Features: Presence | Messages | Visibility | Heartbeat Eviction");

    let config = ChatServerConfig::from_env();
    config.ensure_dirs().await?;
    info!("Storage directory: {:?}", config.storage_dir);

    // Open the document store before serving anything
    let store = Arc::new(JsonDocStore::open(&config.storage_dir).await?);
    let message_store = Arc::new(MessageStore::new(store.clone()));
    let presence_store = Arc::new(PresenceStore::new(store.clone(), message_store.clone()));

    // Start the eviction sweeper, stoppable on shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = sweeper::spawn(
        presence_store.clone(),
        message_store.clone(),
        &config,
        shutdown_rx,
    );
    info!(
        "Eviction sweeper running (tick {}s, staleness {}s)",
        config.sweep_interval_secs, config.staleness_secs
    );

    let app_state = AppState {
        presence: presence_store,
        messages: message_store,
    };
    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    sweeper.await?;
    store.close().await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
