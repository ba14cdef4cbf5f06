//! SAML endpoint handlers.
//!
//! This module provides Axum HTTP handlers for the attribute authority:
//!
//! - **Attribute service** - SOAP binding for `AttributeQuery`
//! - **Metadata endpoint** - Serves attribute authority metadata
//!
//! # Example
//!
//! ```rust,ignore
//! use aa_protocol_saml::endpoints::attribute_authority_router;
//! use axum::Router;
//!
//! let app = Router::new()
//!     .merge(attribute_authority_router())
//!     .with_state(saml_state);
//! ```

mod metadata;
mod query;
mod router;
mod state;

pub use metadata::*;
pub use query::*;
pub use router::*;
pub use state::*;
