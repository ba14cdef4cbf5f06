//! SAML Response types.
//!
//! The response returned by the attribute authority for an `AttributeQuery`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Assertion, Issuer, Status, SAML_VERSION};

/// SAML Response.
///
/// Correlates to the query through `in_response_to` and carries exactly one
/// assertion about the queried subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Unique identifier for this response.
    pub id: String,

    /// The ID of the query this response answers.
    pub in_response_to: String,

    /// Version of the SAML protocol (always "2.0").
    pub version: String,

    /// Timestamp when this response was issued.
    pub issue_instant: DateTime<Utc>,

    /// The responder's issuer.
    pub issuer: Issuer,

    /// The status of the response.
    pub status: Status,

    /// The embedded assertion.
    pub assertion: Assertion,
}

impl Response {
    /// Creates a successful response wrapping `assertion`.
    #[must_use]
    pub fn success(
        id: impl Into<String>,
        in_response_to: impl Into<String>,
        issuer: Issuer,
        issue_instant: DateTime<Utc>,
        assertion: Assertion,
    ) -> Self {
        Self {
            id: id.into(),
            in_response_to: in_response_to.into(),
            version: SAML_VERSION.to_string(),
            issue_instant,
            issuer,
            status: Status::success(),
            assertion,
        }
    }

    /// Returns true if this response indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
