//! SAML endpoint state management.

use std::sync::Arc;

use crate::query::AttributeQueryHandler;

use super::metadata::AuthorityMetadata;

/// SAML endpoint state.
///
/// Cheap to clone; everything inside is immutable after startup.
#[derive(Debug, Clone)]
pub struct SamlState {
    /// The query pipeline.
    pub handler: AttributeQueryHandler,
    /// What the metadata endpoint publishes.
    pub metadata: Arc<AuthorityMetadata>,
}

impl SamlState {
    /// Creates a new SAML state.
    #[must_use]
    pub fn new(handler: AttributeQueryHandler, metadata: AuthorityMetadata) -> Self {
        Self {
            handler,
            metadata: Arc::new(metadata),
        }
    }
}
