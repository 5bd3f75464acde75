//! # Fedgate Server
//!
//! Main entry point for the Fedgate SAML service-provider gateway.

#![forbid(unsafe_code)]

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fg_core::event::{EventEmitter, LoggingEventSink};
use fg_protocol_saml::{register_namespace_prefixes, DefaultEngine, SpState};
use fg_server::config::ServerConfig;
use fg_server::providers::InMemoryUserBackend;
use fg_server::router::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Fedgate starting...");

    let config = ServerConfig::from_env()?;

    // Must run before any protocol document is serialized.
    register_namespace_prefixes();

    let engine = Arc::new(DefaultEngine::new(config.sp.clone()));
    let backend = Arc::new(InMemoryUserBackend::new());
    let events = EventEmitter::new().with_sink(Arc::new(LoggingEventSink));

    let state = SpState::new(config.sp.clone(), engine, backend, events);

    tracing::info!(
        entity_id = %config.sp.entity_id,
        idps = config.sp.idps.len(),
        "service provider configured"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
