//! XML Signature support for SAML.
//!
//! Assertions issued by the attribute authority carry an enveloped XML-DSig
//! signature. The pipeline only knows the [`AssertionSigner`] contract;
//! [`XmlSigner`] is the RSA implementation shipped with the crate.
//!
//! # Signing Algorithms
//!
//! - RSA-SHA256 (default)
//! - RSA-SHA384
//! - RSA-SHA512

mod signer;

pub use signer::*;

use aa_crypto::{DigestAlgorithm, RsaAlgorithm};

use crate::error::SamlResult;
use crate::types::{digest_algorithms, signature_algorithms, transform_algorithms, Assertion};

/// Produces the signature for a fully built assertion.
///
/// Implementations are synchronous: signing is CPU work on key material
/// loaded at startup. Any failure halts the pipeline before output starts.
pub trait AssertionSigner: Send + Sync {
    /// Signs `assertion`, which has no signature attached yet.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureCreation`](crate::SamlError::SignatureCreation)
    /// if no signature can be produced.
    fn sign(&self, assertion: &Assertion) -> SamlResult<XmlSignature>;
}

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256.
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
        }
    }

    /// Returns the corresponding digest algorithm URI.
    #[must_use]
    pub const fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => digest_algorithms::SHA256,
            Self::RsaSha384 => digest_algorithms::SHA384,
            Self::RsaSha512 => digest_algorithms::SHA512,
        }
    }

    /// The digest used for the `Reference`.
    #[must_use]
    pub const fn digest(&self) -> DigestAlgorithm {
        match self {
            Self::RsaSha256 => DigestAlgorithm::Sha256,
            Self::RsaSha384 => DigestAlgorithm::Sha384,
            Self::RsaSha512 => DigestAlgorithm::Sha512,
        }
    }

    /// The RSA scheme used for `SignatureValue`.
    #[must_use]
    pub const fn rsa(&self) -> RsaAlgorithm {
        match self {
            Self::RsaSha256 => RsaAlgorithm::Rs256,
            Self::RsaSha384 => RsaAlgorithm::Rs384,
            Self::RsaSha512 => RsaAlgorithm::Rs512,
        }
    }
}

/// XML Signature structure.
///
/// Represents the `<ds:Signature>` element of a signed assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// The signature algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// The reference URI (`#` followed by the assertion ID).
    pub reference_uri: String,
    /// The digest value (base64 encoded).
    pub digest_value: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// Optional X.509 certificate (base64 encoded, DER format).
    pub x509_certificate: Option<String>,
}

impl XmlSignature {
    /// Renders `<ds:SignedInfo>` in exclusive canonical form.
    ///
    /// These are the exact bytes covered by `signature_value`, and the
    /// encoder emits them verbatim.
    #[must_use]
    pub fn signed_info(&self) -> String {
        signed_info(&self.reference_uri, &self.digest_value, self.algorithm)
    }
}

pub(crate) fn signed_info(
    reference_uri: &str,
    digest_value: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    format!(
        concat!(
            r#"<ds:SignedInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">"#,
            r#"<ds:CanonicalizationMethod Algorithm="{c14n}"></ds:CanonicalizationMethod>"#,
            r#"<ds:SignatureMethod Algorithm="{sig}"></ds:SignatureMethod>"#,
            r#"<ds:Reference URI="{uri}">"#,
            r#"<ds:Transforms>"#,
            r#"<ds:Transform Algorithm="{enveloped}"></ds:Transform>"#,
            r#"<ds:Transform Algorithm="{c14n}"></ds:Transform>"#,
            r#"</ds:Transforms>"#,
            r#"<ds:DigestMethod Algorithm="{digest}"></ds:DigestMethod>"#,
            r#"<ds:DigestValue>{value}</ds:DigestValue>"#,
            r#"</ds:Reference>"#,
            r#"</ds:SignedInfo>"#,
        ),
        c14n = transform_algorithms::EXCLUSIVE_C14N,
        sig = algorithm.uri(),
        uri = reference_uri,
        enveloped = transform_algorithms::ENVELOPED_SIGNATURE,
        digest = algorithm.digest_uri(),
        value = digest_value,
    )
}

/// Configuration for signature creation.
#[derive(Debug, Clone)]
pub struct SignatureConfig {
    /// The signature algorithm to use.
    pub algorithm: SignatureAlgorithm,
    /// Whether to include the X.509 certificate in the signature.
    pub include_certificate: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self::with_algorithm(SignatureAlgorithm::RsaSha256)
    }
}

impl SignatureConfig {
    /// Creates a new signature configuration with the given algorithm.
    #[must_use]
    pub const fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            include_certificate: true,
        }
    }
}
