//! # aa-server
//!
//! HTTP server for the SAML attribute authority.
//!
//! This crate wires the attribute authority together:
//! - SOAP attribute service answering `AttributeQuery` requests
//! - Attribute authority metadata
//! - Health check endpoints
//!
//! ## Usage
//!
//! ```ignore
//! use aa_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let server = Server::new(config).await?;
//! server.run().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod router;

pub use config::ServerConfig;
pub use router::create_router;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use aa_protocol_saml::endpoints::{AuthorityMetadata, SamlState, ATTRIBUTE_QUERY_PATH};
use aa_protocol_saml::{AttributeQueryHandler, ResponderConfig, StaticAttributeRetriever, XmlSigner};
use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

/// The attribute authority server.
pub struct Server {
    config: ServerConfig,
    state: SamlState,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// This loads the signing key, the optional certificate and the attribute
    /// store named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any of those files cannot be read or parsed.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let key_pem = read_file(&config.signing_key_path).await?;
        let cert_pem = match &config.signing_cert_path {
            Some(path) => Some(read_file(path).await?),
            None => None,
        };
        let signer = XmlSigner::from_pem(&key_pem, cert_pem.as_deref())
            .context("failed to load signing key")?;

        let attributes_json = read_file(&config.attributes_path).await?;
        let store = StaticAttributeRetriever::from_json(&attributes_json).with_context(|| {
            format!("failed to load {}", config.attributes_path.display())
        })?;
        tracing::info!(subjects = store.len(), "Attribute store loaded");

        let metadata = AuthorityMetadata {
            entity_id: config.entity_id.clone(),
            attribute_service_url: format!("{}{ATTRIBUTE_QUERY_PATH}", config.base_url),
            certificate_der: signer.certificate_der().map(<[u8]>::to_vec),
        };

        let handler = AttributeQueryHandler::new(ResponderConfig {
            entity_id: config.entity_id.clone(),
            retriever: Arc::new(store),
            signer: Arc::new(signer),
        });

        Ok(Self {
            config,
            state: SamlState::new(handler, metadata),
        })
    }

    /// Runs the server.
    ///
    /// This starts the HTTP server and blocks until it receives a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let app = create_router(self.state);

        let addr: SocketAddr = self.config.bind_address().parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(entity_id = %self.config.entity_id, "Server listening on http://{}", addr);

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Creates a test router without starting the server.
    ///
    /// This is useful for integration testing.
    pub fn test_router(&self) -> Router {
        create_router(self.state.clone())
    }
}

async fn read_file(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
