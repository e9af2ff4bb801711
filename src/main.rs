//! parley-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use parley_gateway::app;
use parley_gateway::app_state::AppState;
use parley_gateway::config::ChatConfig;
use parley_gateway::domain::{EventBus, RoomRegistry};
use parley_gateway::persistence::ChatStore;
use parley_gateway::service::ChatService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ChatConfig::from_env();
    tracing::info!(addr = %config.listen_addr, "starting parley-gateway");

    // Open the store and apply migrations
    let store = ChatStore::connect(&config.database_url, config.database_max_connections).await?;
    store.migrate().await?;

    // Build domain layer
    let registry = Arc::new(RoomRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let chat_service = Arc::new(ChatService::new(store, event_bus.clone()));

    // Build application state and router
    let app_state = AppState {
        chat_service,
        event_bus,
        registry,
    };
    let router = app(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(std::time::Duration::from_secs(30))),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
