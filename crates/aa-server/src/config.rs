//! Server configuration.
//!
//! Configuration is loaded from environment variables (and a `.env` file if
//! present) with sensible defaults for everything except the authority's
//! identity, signing key and attribute store.

use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Public base URL, used for the endpoint locations in metadata.
    pub base_url: String,

    /// Entity ID placed in the `Issuer` of every response and assertion.
    pub entity_id: String,

    /// PEM file holding the RSA signing key.
    pub signing_key_path: PathBuf,

    /// PEM file holding the signing certificate, embedded in signatures and
    /// metadata when set.
    pub signing_cert_path: Option<PathBuf>,

    /// JSON file backing the static attribute store.
    pub attributes_path: PathBuf,

    /// Log level.
    pub log_level: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `AA_ENTITY_ID`, `AA_SIGNING_KEY` or
    /// `AA_ATTRIBUTES` is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("AA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("AA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let base_url = std::env::var("AA_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"));

        let entity_id = required("AA_ENTITY_ID")?;
        let signing_key_path = required("AA_SIGNING_KEY").map(PathBuf::from)?;
        let signing_cert_path = std::env::var("AA_SIGNING_CERT").ok().map(PathBuf::from);
        let attributes_path = required("AA_ATTRIBUTES").map(PathBuf::from)?;

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            entity_id,
            signing_key_path,
            signing_cert_path,
            attributes_path,
            log_level,
        })
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing(
        signing_key_path: impl Into<PathBuf>,
        attributes_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            base_url: "http://localhost:8080".to_string(),
            entity_id: "https://aa.example.com".to_string(),
            signing_key_path: signing_key_path.into(),
            signing_cert_path: None,
            attributes_path: attributes_path.into(),
            log_level: "debug".to_string(),
        }
    }

    /// Adds a signing certificate.
    #[must_use]
    pub fn with_signing_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.signing_cert_path = Some(path.into());
        self
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testing_config_binds_random_port() {
        let config = ServerConfig::for_testing("key.pem", "attributes.json");
        assert_eq!(config.bind_address(), "127.0.0.1:0");
        assert!(config.signing_cert_path.is_none());
    }

    #[test]
    fn signing_cert_is_optional() {
        let config =
            ServerConfig::for_testing("key.pem", "attributes.json").with_signing_cert("cert.pem");
        assert_eq!(config.signing_cert_path, Some(PathBuf::from("cert.pem")));
    }

    #[test]
    fn missing_required_variable_is_named() {
        let err = required("AA_TEST_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("AA_TEST_SURELY_UNSET_VARIABLE"));
    }
}
