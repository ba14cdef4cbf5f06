//! SAML error types.
//!
//! Every failure of the attribute query pipeline is a [`SamlError`]. The
//! variant encodes the stage that failed, which in turn decides the HTTP
//! status, the SAML status code and whether anything may still be reported
//! to the requester.

use thiserror::Error;


/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// Coarse classification of a [`SamlError`] by pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request body could not be decoded into an `AttributeQuery`.
    Decode,
    /// The query was decoded but rejected by the validation stage.
    Validation,
    /// The attribute retriever failed.
    Resolution,
    /// The signer failed.
    Signing,
    /// Serialization failed after output had started.
    PostWrite,
    /// Configuration or key material problem outside a request.
    Setup,
}

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Missing required element or attribute.
    #[error("missing required element: {0}")]
    MissingElement(String),

    /// The query was well-formed but is not acceptable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Attribute lookup failed.
    #[error("attribute resolution failed: {0}")]
    AttributeResolution(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// Writing the response failed.
    #[error("response encoding failed: {0}")]
    Encoding(String),

    /// Cryptographic key or certificate problem.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl SamlError {
    /// Returns the pipeline stage this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::XmlParse(_) | Self::MissingElement(_) => ErrorKind::Decode,
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::AttributeResolution(_) => ErrorKind::Resolution,
            Self::SignatureCreation(_) => ErrorKind::Signing,
            Self::Encoding(_) => ErrorKind::PostWrite,
            Self::Crypto(_) => ErrorKind::Setup,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Decode | ErrorKind::Validation => 400,
            _ => 500,
        }
    }

    /// Returns a message that is safe to show to the requester.
    ///
    /// The detailed error text may contain directory or key-store internals
    /// and is only ever logged.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Decode => "malformed attribute query",
            ErrorKind::Validation => "attribute query rejected",
            _ => "attribute query could not be processed",
        }
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SamlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<crate::attributes::RetrieverError> for SamlError {
    fn from(err: crate::attributes::RetrieverError) -> Self {
        Self::AttributeResolution(err.to_string())
    }
}

impl From<aa_crypto::CryptoError> for SamlError {
    fn from(err: aa_crypto::CryptoError) -> Self {
        Self::Crypto(err.to_string())
    }
}
