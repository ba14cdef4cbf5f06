//! SAML router configuration.
//!
//! Provides the Axum router for the attribute authority endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::metadata::authority_metadata;
use super::query::attribute_query;
use super::state::SamlState;

/// Path of the SOAP attribute service.
pub const ATTRIBUTE_QUERY_PATH: &str = "/saml/attribute-query";

/// Path of the metadata document.
pub const METADATA_PATH: &str = "/saml/metadata";

/// Creates the attribute authority router.
///
/// # Endpoints
///
/// | Method | Path                    | Handler              | Description              |
/// |--------|-------------------------|----------------------|--------------------------|
/// | POST   | `/saml/attribute-query` | `attribute_query`    | SOAP attribute service   |
/// | GET    | `/saml/metadata`        | `authority_metadata` | Attribute authority metadata |
///
/// # Usage
///
/// ```rust,ignore
/// use aa_protocol_saml::endpoints::{attribute_authority_router, SamlState};
///
/// let state = SamlState::new(handler, metadata);
/// let app = Router::new()
///     .merge(attribute_authority_router())
///     .with_state(state);
/// ```
pub fn attribute_authority_router() -> Router<SamlState> {
    Router::new()
        .route(ATTRIBUTE_QUERY_PATH, post(attribute_query))
        .route(METADATA_PATH, get(authority_metadata))
}
