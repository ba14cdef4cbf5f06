//! # Attribute Authority Server
//!
//! Main entry point for the SAML attribute authority.

#![forbid(unsafe_code)]

use aa_server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Attribute authority starting...");

    Server::new(config).await?.run().await
}
