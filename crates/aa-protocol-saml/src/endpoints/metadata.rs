//! Attribute authority metadata endpoint.
//!
//! Publishes an `EntityDescriptor` with a single
//! `AttributeAuthorityDescriptor` so relying parties can discover the SOAP
//! attribute service and the key that signs assertions.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use base64::Engine;

use crate::codec::{XmlOut, XML_DECLARATION};
use crate::error::{SamlError, SamlResult};
use crate::types::{NameIdFormat, MD_NS, SAMLP_NS, SOAP_BINDING, XMLDSIG_NS};

use super::state::SamlState;

/// Content type for SAML metadata documents.
pub const METADATA_CONTENT_TYPE: &str = "application/samlmetadata+xml";

/// What the attribute authority advertises about itself.
#[derive(Debug, Clone)]
pub struct AuthorityMetadata {
    /// The responder's entity ID.
    pub entity_id: String,
    /// Absolute URL of the SOAP attribute service.
    pub attribute_service_url: String,
    /// Signing certificate (DER), published as a signing `KeyDescriptor`.
    pub certificate_der: Option<Vec<u8>>,
}

/// GET handler for the metadata endpoint.
pub async fn authority_metadata(State(state): State<SamlState>) -> impl IntoResponse {
    match render_metadata(&state.metadata) {
        Ok(metadata) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, METADATA_CONTENT_TYPE)],
            metadata,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render metadata");
            (
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.public_message(),
            )
                .into_response()
        }
    }
}

/// Renders the metadata document.
///
/// # Errors
///
/// Returns [`SamlError::Encoding`] if serialization fails.
pub fn render_metadata(metadata: &AuthorityMetadata) -> SamlResult<String> {
    let mut out = XmlOut::new(Vec::new());
    out.raw(XML_DECLARATION)?;
    out.open(
        "md:EntityDescriptor",
        &[("xmlns:md", MD_NS), ("entityID", metadata.entity_id.as_str())],
    )?;
    out.open(
        "md:AttributeAuthorityDescriptor",
        &[("protocolSupportEnumeration", SAMLP_NS)],
    )?;

    if let Some(der) = &metadata.certificate_der {
        let certificate = base64::engine::general_purpose::STANDARD.encode(der);
        out.open("md:KeyDescriptor", &[("use", "signing")])?;
        out.open("ds:KeyInfo", &[("xmlns:ds", XMLDSIG_NS)])?;
        out.open("ds:X509Data", &[])?;
        out.leaf("ds:X509Certificate", &[], &certificate)?;
        out.close("ds:X509Data")?;
        out.close("ds:KeyInfo")?;
        out.close("md:KeyDescriptor")?;
    }

    out.leaf(
        "md:AttributeService",
        &[
            ("Binding", SOAP_BINDING),
            ("Location", metadata.attribute_service_url.as_str()),
        ],
        "",
    )?;
    for format in NameIdFormat::SUPPORTED {
        out.leaf("md:NameIDFormat", &[], format.uri())?;
    }

    out.close("md:AttributeAuthorityDescriptor")?;
    out.close("md:EntityDescriptor")?;

    String::from_utf8(out.into_inner()).map_err(|e| SamlError::Encoding(e.to_string()))
}
