//! SAML 2.0 Attribute Authority.
//!
//! This crate answers SAML `AttributeQuery` requests with signed
//! `Response`/`Assertion` messages:
//!
//! - **Query decoding** - Read SOAP-wrapped attribute queries
//! - **Attribute resolution** - Delegate lookups to a pluggable store
//! - **Assertion generation** - Audience-restricted, time-bounded assertions
//! - **XML signature** - Enveloped RSA XML-DSig over each assertion
//! - **HTTP endpoints** - SOAP attribute service and metadata
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`types`] - Core SAML types and data structures
//! - [`codec`] - XML decoding of queries and streaming encoding of responses
//! - [`attributes`] - The attribute retriever contract and a static store
//! - [`query`] - The query pipeline and its injectable collaborators
//! - [`signature`] - XML signature creation
//! - [`endpoints`] - Axum HTTP handlers
//! - [`error`] - Error types for SAML operations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aa_protocol_saml::{AttributeQueryHandler, ResponderConfig};
//!
//! let handler = AttributeQueryHandler::new(ResponderConfig {
//!     entity_id: "https://aa.example.com".to_string(),
//!     retriever: Arc::new(store),
//!     signer: Arc::new(signer),
//! });
//! let outcome = handler.respond(&body, &mut sink).await;
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
pub mod codec;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod signature;
pub mod types;

pub use attributes::{AttributeRetriever, RetrieverError, StaticAttributeRetriever};
pub use error::{SamlError, SamlResult};
pub use query::{AttributeQueryHandler, QueryOutcome, ResponderConfig};
pub use signature::{AssertionSigner, XmlSigner};
pub use types::*;
