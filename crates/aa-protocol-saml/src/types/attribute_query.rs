//! SAML AttributeQuery types.
//!
//! An attribute query is sent by a relying party, wrapped in a SOAP
//! envelope, to look up a subject's attributes out of band.

use serde::{Deserialize, Serialize};

use super::NameId;

/// A decoded `<samlp:AttributeQuery>`.
///
/// Immutable once decoded; the responder copies values out of it but never
/// rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeQuery {
    /// The query ID, echoed back as `InResponseTo`.
    pub id: String,

    /// The declared protocol version, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The raw `IssueInstant` attribute, if any. Not interpreted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_instant: Option<String>,

    /// Entity ID of the relying party asking.
    pub issuer: String,

    /// The subject whose attributes are requested.
    pub name_id: NameId,
}

impl AttributeQuery {
    /// Creates a query for `name_id` from `issuer`.
    #[must_use]
    pub fn new(id: impl Into<String>, issuer: impl Into<String>, name_id: NameId) -> Self {
        Self {
            id: id.into(),
            version: None,
            issue_instant: None,
            issuer: issuer.into(),
            name_id,
        }
    }

    /// Sets the declared version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Maps the queried subject to the identity handed to the attribute store.
    #[must_use]
    pub fn authenticated_user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            name: self.name_id.value.clone(),
            format: self.name_id.format.clone(),
        }
    }
}

/// The identity whose attributes are looked up.
///
/// Built fresh for each query from the subject's name ID; carries no session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// The subject's name ID value.
    pub name: String,

    /// The subject's name ID format, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl AuthenticatedUser {
    /// Creates an identity with no format.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: None,
        }
    }
}
