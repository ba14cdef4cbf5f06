//! Attribute resolution.
//!
//! The responder does not own any identity data. It hands the queried
//! identity to an [`AttributeRetriever`] and copies whatever comes back into
//! the assertion, without retrying, caching or filtering.

use std::collections::HashMap;

use crate::types::{Attribute, AuthenticatedUser};

/// Looks up the attributes of an identity.
///
/// Implementations may do network or storage I/O and may be slow. Timeouts
/// and retries are theirs to impose.
#[async_trait::async_trait]
pub trait AttributeRetriever: Send + Sync + 'static {
    /// Returns the attributes released for `user`, in release order.
    async fn retrieve(&self, user: &AuthenticatedUser) -> Result<Vec<Attribute>, RetrieverError>;
}

/// Error type for attribute retrieval.
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// The store has no entry for the subject.
    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    /// The backing store failed.
    #[error("attribute store error: {0}")]
    Backend(String),
}

/// In-memory attribute store keyed by subject name.
///
/// Loaded from JSON of the form
/// `{"alice": [{"name": "email", "values": ["alice@example.com"]}]}`.
#[derive(Debug, Clone, Default)]
pub struct StaticAttributeRetriever {
    subjects: HashMap<String, Vec<Attribute>>,
}

impl StaticAttributeRetriever {
    /// Creates a store from a subject-to-attributes map.
    #[must_use]
    pub const fn new(subjects: HashMap<String, Vec<Attribute>>) -> Self {
        Self { subjects }
    }

    /// Parses a store from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::Backend`] if the JSON is not a map of
    /// subject names to attribute lists.
    pub fn from_json(json: &str) -> Result<Self, RetrieverError> {
        serde_json::from_str(json)
            .map(Self::new)
            .map_err(|e| RetrieverError::Backend(format!("invalid attribute store: {e}")))
    }

    /// Adds or replaces a subject's attributes.
    #[must_use]
    pub fn with_subject(mut self, name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        self.subjects.insert(name.into(), attributes);
        self
    }

    /// Number of subjects in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Returns true if the store holds no subjects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[async_trait::async_trait]
impl AttributeRetriever for StaticAttributeRetriever {
    async fn retrieve(&self, user: &AuthenticatedUser) -> Result<Vec<Attribute>, RetrieverError> {
        self.subjects
            .get(&user.name)
            .cloned()
            .ok_or_else(|| RetrieverError::UnknownSubject(user.name.clone()))
    }
}
