//! The attribute query pipeline.
//!
//! Each query runs once, strictly in order:
//!
//! 1. decode the SOAP-wrapped `AttributeQuery`
//! 2. validate it
//! 3. resolve the subject's attributes
//! 4. build the assertion and the response around it
//! 5. sign the assertion
//! 6. stream the response out
//!
//! Failures in steps 1–5 happen before any output and leave the sink
//! untouched. Once step 6 begins the response is committed: an error there
//! can only be logged.

mod build;
mod clock;
mod validate;

pub use build::*;
pub use clock::*;
pub use validate::*;

use std::io::Write;
use std::sync::Arc;

use crate::attributes::AttributeRetriever;
use crate::codec::{decode_attribute_query, ResponseEncoder};
use crate::error::{ErrorKind, SamlError, SamlResult};
use crate::signature::AssertionSigner;
use crate::types::Response;

/// Immutable responder configuration, shared by all queries.
#[derive(Clone)]
pub struct ResponderConfig {
    /// The responder's own entity ID, used as `Issuer`.
    pub entity_id: String,
    /// Attribute source.
    pub retriever: Arc<dyn AttributeRetriever>,
    /// Assertion signer.
    pub signer: Arc<dyn AssertionSigner>,
}

impl std::fmt::Debug for ResponderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponderConfig")
            .field("entity_id", &self.entity_id)
            .finish_non_exhaustive()
    }
}

/// How a call to [`AttributeQueryHandler::respond`] ended.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The full response was written.
    Done,
    /// The query failed before anything was written.
    Failed(SamlError),
    /// Writing started and then failed; the sink holds a truncated response.
    PartiallyWritten(SamlError),
}

impl QueryOutcome {
    /// Returns true if the full response was written.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the error that ended the query, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&SamlError> {
        match self {
            Self::Done => None,
            Self::Failed(err) | Self::PartiallyWritten(err) => Some(err),
        }
    }
}

/// Answers attribute queries.
///
/// Holds no per-request state, so one handler serves concurrent queries.
#[derive(Clone)]
pub struct AttributeQueryHandler {
    config: ResponderConfig,
    validator: Arc<dyn QueryValidator>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl AttributeQueryHandler {
    /// Creates a handler with structural validation, the system clock and
    /// UUID identifiers.
    #[must_use]
    pub fn new(config: ResponderConfig) -> Self {
        Self {
            config,
            validator: Arc::new(StructuralValidator),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIdGenerator),
        }
    }

    /// Replaces the query validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl QueryValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the ID generator.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Returns the responder's entity ID.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.config.entity_id
    }

    /// Runs the pipeline up to and including signing.
    ///
    /// # Errors
    ///
    /// Returns the error of the first stage that failed. Later stages and
    /// their collaborators are not invoked.
    #[tracing::instrument(
        skip_all,
        fields(query_id = tracing::field::Empty, issuer = tracing::field::Empty)
    )]
    pub async fn process(&self, body: &[u8]) -> SamlResult<Response> {
        let query = decode_attribute_query(body)?;
        let span = tracing::Span::current();
        span.record("query_id", query.id.as_str());
        span.record("issuer", query.issuer.as_str());

        self.validator.validate(&query)?;

        let user = query.authenticated_user();
        tracing::debug!(subject = %user.name, "resolving attributes");
        let attributes = self.config.retriever.retrieve(&user).await?;

        let now = self.clock.now();
        let assertion = build_assertion(
            self.ids.new_id(),
            &self.config.entity_id,
            &query,
            attributes,
            now,
        );
        let mut response = build_response(
            self.ids.new_id(),
            &self.config.entity_id,
            &query,
            assertion,
            now,
        );

        let signature = self
            .config
            .signer
            .sign(&response.assertion)
            .map_err(|e| match e {
                SamlError::SignatureCreation(_) => e,
                other => SamlError::SignatureCreation(other.to_string()),
            })?;
        response.assertion.signature = Some(signature);

        tracing::debug!(
            response_id = %response.id,
            assertion_id = %response.assertion.id,
            "assertion signed"
        );
        Ok(response)
    }

    /// Runs the full pipeline, streaming the response into `sink`.
    ///
    /// Nothing is written to `sink` unless every stage up to signing
    /// succeeded.
    pub async fn respond<W: Write>(&self, body: &[u8], sink: W) -> QueryOutcome {
        let response = match self.process(body).await {
            Ok(response) => response,
            Err(err) => {
                match err.kind() {
                    ErrorKind::Decode | ErrorKind::Validation => {
                        tracing::warn!(error = %err, "attribute query rejected");
                    }
                    _ => tracing::error!(error = %err, "attribute query failed"),
                }
                return QueryOutcome::Failed(err);
            }
        };

        let mut encoder = ResponseEncoder::new(sink);
        match encoder.encode(&response) {
            Ok(()) => {
                tracing::info!(
                    response_id = %response.id,
                    in_response_to = %response.in_response_to,
                    "attribute query answered"
                );
                QueryOutcome::Done
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    response_id = %response.id,
                    "response stream failed after output started"
                );
                QueryOutcome::PartiallyWritten(err)
            }
        }
    }
}

impl std::fmt::Debug for AttributeQueryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeQueryHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
