//! Error type for cryptographic operations.

use thiserror::Error;

/// Error type for key handling and signature operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Verification failed.
    #[error("signature verification failed")]
    Verification,

    /// Invalid key format.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// Malformed PEM input.
    #[error("invalid PEM: {0}")]
    InvalidPem(String),
}
