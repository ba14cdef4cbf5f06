//! Query validation.
//!
//! Runs between decoding and attribute lookup. Only queries that pass are
//! allowed to disclose attributes. Requester authentication (signature
//! checks, issuer trust, freshness) plugs in here as another
//! [`QueryValidator`].

use crate::error::{SamlError, SamlResult};
use crate::types::{AttributeQuery, SAML_VERSION};

/// Maximum length of the query `ID`.
pub const MAX_QUERY_ID_LENGTH: usize = 256;

/// Maximum length of the query `Issuer`.
pub const MAX_ISSUER_LENGTH: usize = 1024;

/// Decides whether a decoded query may be answered.
pub trait QueryValidator: Send + Sync {
    /// Accepts or rejects `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidRequest`] if the query must not be answered.
    fn validate(&self, query: &AttributeQuery) -> SamlResult<()>;
}

/// Structural checks on the fields the responder echoes back.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl QueryValidator for StructuralValidator {
    fn validate(&self, query: &AttributeQuery) -> SamlResult<()> {
        if let Some(version) = &query.version {
            if version != SAML_VERSION {
                return Err(SamlError::InvalidRequest(format!(
                    "unsupported SAML version: {version}"
                )));
            }
        }

        if query.id.is_empty() {
            return Err(SamlError::InvalidRequest("empty query ID".to_string()));
        }
        if query.id.len() > MAX_QUERY_ID_LENGTH {
            return Err(SamlError::InvalidRequest(format!(
                "query ID exceeds {MAX_QUERY_ID_LENGTH} characters"
            )));
        }

        if query.issuer.is_empty() {
            return Err(SamlError::InvalidRequest("empty issuer".to_string()));
        }
        if query.issuer.len() > MAX_ISSUER_LENGTH {
            return Err(SamlError::InvalidRequest(format!(
                "issuer exceeds {MAX_ISSUER_LENGTH} characters"
            )));
        }

        if query.name_id.value.is_empty() {
            return Err(SamlError::InvalidRequest("empty subject NameID".to_string()));
        }

        Ok(())
    }
}
