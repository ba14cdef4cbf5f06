//! RSA PKCS#1 v1.5 signatures.
//!
//! XML-DSig over SAML uses `rsa-sha256` almost universally, with
//! `rsa-sha384`/`rsa-sha512` as the stronger alternatives.

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, KeyPair, RsaKeyPair, UnparsedPublicKey},
};

use crate::error::CryptoError;

/// RSA signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsaAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256.
    #[default]
    Rs256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    Rs384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    Rs512,
}

impl RsaAlgorithm {
    /// Returns the XML-DSig algorithm URI.
    #[must_use]
    pub const fn xml_dsig_uri(self) -> &'static str {
        match self {
            Self::Rs256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::Rs384 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384",
            Self::Rs512 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
        }
    }

    fn padding(self) -> &'static dyn signature::RsaEncoding {
        match self {
            Self::Rs256 => &signature::RSA_PKCS1_SHA256,
            Self::Rs384 => &signature::RSA_PKCS1_SHA384,
            Self::Rs512 => &signature::RSA_PKCS1_SHA512,
        }
    }

    fn verification(self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            Self::Rs256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            Self::Rs384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            Self::Rs512 => &signature::RSA_PKCS1_2048_8192_SHA512,
        }
    }
}

/// A parsed RSA private key.
///
/// The key is parsed once at construction so that per-request signing does
/// no DER work.
pub struct RsaSigningKey {
    key_pair: RsaKeyPair,
    rng: SystemRandom,
}

impl RsaSigningKey {
    /// Parses an RSA private key from DER (PKCS#8 or PKCS#1).
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be parsed.
    pub fn from_der(key_der: &[u8]) -> Result<Self, CryptoError> {
        let key_pair = RsaKeyPair::from_pkcs8(key_der)
            .or_else(|_| RsaKeyPair::from_der(key_der))
            .map_err(|e| CryptoError::InvalidKey(format!("invalid RSA key: {e}")))?;

        Ok(Self {
            key_pair,
            rng: SystemRandom::new(),
        })
    }

    /// Signs `data` with the given algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(&self, data: &[u8], algorithm: RsaAlgorithm) -> Result<Vec<u8>, CryptoError> {
        let mut sig = vec![0u8; self.key_pair.public_modulus_len()];

        self.key_pair
            .sign(algorithm.padding(), &self.rng, data, &mut sig)
            .map_err(|e| CryptoError::Signing(format!("RSA signing failed: {e}")))?;

        Ok(sig)
    }

    /// Returns the DER-encoded `RSAPublicKey` of this key.
    #[must_use]
    pub fn public_key_der(&self) -> Vec<u8> {
        self.key_pair.public_key().as_ref().to_vec()
    }
}

impl std::fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSigningKey")
            .field("modulus_len", &self.key_pair.public_modulus_len())
            .finish_non_exhaustive()
    }
}

/// Verifies an RSA signature.
///
/// # Errors
///
/// Returns [`CryptoError::Verification`] if the signature does not match.
pub fn rsa_verify(
    public_key_der: &[u8],
    data: &[u8],
    sig: &[u8],
    algorithm: RsaAlgorithm,
) -> Result<(), CryptoError> {
    UnparsedPublicKey::new(algorithm.verification(), public_key_der)
        .verify(data, sig)
        .map_err(|_| CryptoError::Verification)
}
