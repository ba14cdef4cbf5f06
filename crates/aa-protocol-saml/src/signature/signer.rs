//! XML Signature creation.
//!
//! Signs assertions with an enveloped RSA XML-DSig signature.

use aa_crypto::RsaSigningKey;
use base64::Engine;

use crate::codec::assertion_signing_form;
use crate::error::{SamlError, SamlResult};
use crate::types::Assertion;

use super::{signed_info, AssertionSigner, SignatureConfig, XmlSignature};

/// XML assertion signer.
///
/// Holds the parsed RSA key and the optional certificate advertised in
/// `KeyInfo` and in metadata.
#[derive(Debug)]
pub struct XmlSigner {
    key: RsaSigningKey,
    certificate_der: Option<Vec<u8>>,
    config: SignatureConfig,
}

impl XmlSigner {
    /// Creates a new signer from a DER private key (PKCS#8 or PKCS#1).
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Crypto`] if the key cannot be parsed.
    pub fn new(private_key_der: &[u8], certificate_der: Option<Vec<u8>>) -> SamlResult<Self> {
        Ok(Self {
            key: RsaSigningKey::from_der(private_key_der)?,
            certificate_der,
            config: SignatureConfig::default(),
        })
    }

    /// Creates a new signer from PEM-encoded key and certificate.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Crypto`] if either PEM block is missing or invalid.
    pub fn from_pem(private_key_pem: &str, certificate_pem: Option<&str>) -> SamlResult<Self> {
        let private_key_der = aa_crypto::pem_to_der(private_key_pem, "PRIVATE KEY")
            .or_else(|_| aa_crypto::pem_to_der(private_key_pem, "RSA PRIVATE KEY"))?;

        let certificate_der = certificate_pem
            .map(|pem| aa_crypto::pem_to_der(pem, "CERTIFICATE"))
            .transpose()?;

        Self::new(&private_key_der, certificate_der)
    }

    /// Sets the signature configuration.
    #[must_use]
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the signing certificate, if one was configured.
    #[must_use]
    pub fn certificate_der(&self) -> Option<&[u8]> {
        self.certificate_der.as_deref()
    }

    /// Returns the DER `RSAPublicKey` matching the signing key.
    #[must_use]
    pub fn public_key_der(&self) -> Vec<u8> {
        self.key.public_key_der()
    }
}

impl AssertionSigner for XmlSigner {
    fn sign(&self, assertion: &Assertion) -> SamlResult<XmlSignature> {
        let engine = base64::engine::general_purpose::STANDARD;
        let algorithm = self.config.algorithm;

        let canonical = assertion_signing_form(assertion)
            .map_err(|e| SamlError::SignatureCreation(format!("canonicalization failed: {e}")))?;
        let digest_value = engine.encode(aa_crypto::digest(algorithm.digest(), &canonical));

        let reference_uri = format!("#{}", assertion.id);
        let info = signed_info(&reference_uri, &digest_value, algorithm);

        let signature = self
            .key
            .sign(info.as_bytes(), algorithm.rsa())
            .map_err(|e| SamlError::SignatureCreation(e.to_string()))?;

        let x509_certificate = if self.config.include_certificate {
            self.certificate_der.as_ref().map(|der| engine.encode(der))
        } else {
            None
        };

        tracing::debug!(assertion_id = %assertion.id, algorithm = algorithm.uri(), "assertion signed");

        Ok(XmlSignature {
            algorithm,
            reference_uri,
            digest_value,
            signature_value: engine.encode(signature),
            x509_certificate,
        })
    }
}
