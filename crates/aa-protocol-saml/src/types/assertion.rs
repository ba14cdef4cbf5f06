//! SAML Assertion types.
//!
//! Assertions contain statements about a subject made by an issuer. The
//! attribute authority only ever issues attribute statements, bounded by a
//! validity window and restricted to the querying relying party.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Issuer, NameId, SAML_VERSION};
use crate::signature::XmlSignature;

/// Lifetime of every issued assertion, counted from its issue instant.
pub const ASSERTION_VALIDITY_MINUTES: i64 = 5;

/// SAML Assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assertion {
    /// Unique identifier for this assertion.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    pub version: String,

    /// Timestamp when this assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// The issuing authority.
    pub issuer: Issuer,

    /// The subject of this assertion.
    pub subject: Subject,

    /// Conditions that must be evaluated for the assertion to be valid.
    pub conditions: Conditions,

    /// Attribute statement; absent when the subject has no attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_statement: Option<AttributeStatement>,

    /// Enveloped signature, attached once signing succeeded.
    #[serde(skip)]
    pub signature: Option<XmlSignature>,
}

impl Assertion {
    /// Creates an unsigned assertion issued at `issue_instant`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        issuer: Issuer,
        issue_instant: DateTime<Utc>,
        subject: Subject,
        conditions: Conditions,
    ) -> Self {
        Self {
            id: id.into(),
            version: SAML_VERSION.to_string(),
            issue_instant,
            issuer,
            subject,
            conditions,
            attribute_statement: None,
            signature: None,
        }
    }

    /// Sets the attribute statement.
    #[must_use]
    pub fn with_attribute_statement(mut self, statement: AttributeStatement) -> Self {
        self.attribute_statement = Some(statement);
        self
    }

    /// Returns true once a signature has been attached.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// Subject of an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// The name identifier for the subject.
    pub name_id: NameId,
}

impl Subject {
    /// Creates a new subject with a name ID.
    #[must_use]
    pub const fn new(name_id: NameId) -> Self {
        Self { name_id }
    }
}

/// Conditions for assertion validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    pub not_before: DateTime<Utc>,

    /// Time at or after which the assertion is not valid.
    pub not_on_or_after: DateTime<Utc>,

    /// Audience restrictions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<AudienceRestriction>,
}

impl Conditions {
    /// Creates the standard validity window starting at `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            not_before: now,
            not_on_or_after: now + Duration::minutes(ASSERTION_VALIDITY_MINUTES),
            audience_restrictions: Vec::new(),
        }
    }

    /// Adds an audience restriction.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience_restrictions.push(AudienceRestriction {
            audiences: vec![audience.into()],
        });
        self
    }

    /// Returns the length of the validity window.
    #[must_use]
    pub fn validity(&self) -> Duration {
        self.not_on_or_after - self.not_before
    }
}

/// Audience restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceRestriction {
    /// List of valid audiences.
    pub audiences: Vec<String>,
}

/// Attribute statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeStatement {
    /// List of attributes.
    pub attributes: Vec<Attribute>,
}

impl AttributeStatement {
    /// Creates an attribute statement holding the resolved attributes, in order.
    #[must_use]
    pub const fn from_attributes(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// Returns the values of the first attribute called `name`.
    #[must_use]
    pub fn values_of(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.values.as_slice())
    }
}

/// SAML Attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name (typically a URI).
    pub name: String,

    /// The format of the attribute name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// A human-readable name for the attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// The attribute values.
    pub values: Vec<String>,
}

impl Attribute {
    /// URI name format.
    pub const NAME_FORMAT_URI: &'static str = "urn:oasis:names:tc:SAML:2.0:attrname-format:uri";

    /// Basic name format.
    pub const NAME_FORMAT_BASIC: &'static str =
        "urn:oasis:names:tc:SAML:2.0:attrname-format:basic";

    /// Creates a new attribute with a single value.
    #[must_use]
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::multi(name, vec![value.into()])
    }

    /// Creates a new attribute with multiple values.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            name_format: None,
            friendly_name: None,
            values,
        }
    }

    /// Sets the friendly name.
    #[must_use]
    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    /// Sets the name format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.name_format = Some(format.into());
        self
    }
}
