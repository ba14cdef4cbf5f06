//! # aa-crypto
//!
//! Cryptographic primitives for the attribute authority, built on aws-lc-rs.
//!
//! The XML-DSig layer in `aa-protocol-saml` needs exactly two things from
//! this crate: message digests and RSA PKCS#1 v1.5 signatures. Both are
//! exposed here behind small, algorithm-tagged APIs so that the protocol
//! crate never touches aws-lc-rs directly.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod hash;
pub mod pem;
pub mod rsa;

pub use error::CryptoError;
pub use hash::{digest, sha256, sha384, sha512, DigestAlgorithm};
pub use pem::pem_to_der;
pub use rsa::{rsa_verify, RsaAlgorithm, RsaSigningKey};
