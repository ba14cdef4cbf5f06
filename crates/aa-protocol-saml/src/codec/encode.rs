//! Response encoding.

use std::io::Write;

use crate::error::SamlResult;
use crate::signature::XmlSignature;
use crate::types::{
    Assertion, Attribute, Conditions, Issuer, NameId, Response, Status, SAMLP_NS, SAML_NS,
    SOAP_ENV_NS, XMLDSIG_NS,
};

use super::{format_instant, XmlOut, XML_DECLARATION};

/// Streams a SOAP-wrapped SAML response to a sink.
///
/// Writing is not transactional: once [`ResponseEncoder::encode`] has been
/// called, bytes may have reached the sink even if it returns an error.
pub struct ResponseEncoder<W: Write> {
    out: XmlOut<W>,
}

impl<W: Write> ResponseEncoder<W> {
    /// Creates an encoder writing to `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            out: XmlOut::new(sink),
        }
    }

    /// Writes the XML declaration and the full envelope, then flushes.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Encoding`](crate::SamlError::Encoding) if the sink
    /// fails. Output may be partial at that point.
    pub fn encode(&mut self, response: &Response) -> SamlResult<()> {
        let out = &mut self.out;
        out.raw(XML_DECLARATION)?;
        out.open("soap:Envelope", &[("xmlns:soap", SOAP_ENV_NS)])?;
        out.open("soap:Body", &[])?;
        write_response(out, response)?;
        out.close("soap:Body")?;
        out.close("soap:Envelope")?;
        out.flush()
    }

    /// Consumes the encoder, returning the sink.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// Serializes `assertion` the way it is digested for signing: exclusive
/// canonical form with any signature left out.
///
/// # Errors
///
/// Returns [`SamlError::Encoding`](crate::SamlError::Encoding) if
/// serialization fails.
pub fn assertion_signing_form(assertion: &Assertion) -> SamlResult<Vec<u8>> {
    let mut out = XmlOut::new(Vec::new());
    write_assertion(&mut out, assertion, false)?;
    Ok(out.into_inner())
}

fn write_response<W: Write>(out: &mut XmlOut<W>, response: &Response) -> SamlResult<()> {
    let issue_instant = format_instant(&response.issue_instant);
    out.open(
        "samlp:Response",
        &[
            ("xmlns:samlp", SAMLP_NS),
            ("xmlns:saml", SAML_NS),
            ("ID", response.id.as_str()),
            ("InResponseTo", response.in_response_to.as_str()),
            ("IssueInstant", issue_instant.as_str()),
            ("Version", response.version.as_str()),
        ],
    )?;
    write_issuer(out, &response.issuer)?;
    write_status(out, &response.status)?;
    write_assertion(out, &response.assertion, true)?;
    out.close("samlp:Response")
}

fn write_status<W: Write>(out: &mut XmlOut<W>, status: &Status) -> SamlResult<()> {
    out.open("samlp:Status", &[])?;
    out.open("samlp:StatusCode", &[("Value", status.status_code.value.as_str())])?;
    if let Some(nested) = &status.status_code.status_code {
        out.leaf("samlp:StatusCode", &[("Value", nested.value.as_str())], "")?;
    }
    out.close("samlp:StatusCode")?;
    if let Some(message) = &status.status_message {
        out.leaf("samlp:StatusMessage", &[], message)?;
    }
    out.close("samlp:Status")
}

fn write_assertion<W: Write>(
    out: &mut XmlOut<W>,
    assertion: &Assertion,
    with_signature: bool,
) -> SamlResult<()> {
    let issue_instant = format_instant(&assertion.issue_instant);
    out.open(
        "saml:Assertion",
        &[
            ("xmlns:saml", SAML_NS),
            ("ID", assertion.id.as_str()),
            ("IssueInstant", issue_instant.as_str()),
            ("Version", assertion.version.as_str()),
        ],
    )?;
    write_issuer(out, &assertion.issuer)?;
    if with_signature {
        if let Some(signature) = &assertion.signature {
            write_signature(out, signature)?;
        }
    }

    out.open("saml:Subject", &[])?;
    write_name_id(out, &assertion.subject.name_id)?;
    out.close("saml:Subject")?;

    write_conditions(out, &assertion.conditions)?;

    if let Some(statement) = &assertion.attribute_statement {
        out.open("saml:AttributeStatement", &[])?;
        for attribute in &statement.attributes {
            write_attribute(out, attribute)?;
        }
        out.close("saml:AttributeStatement")?;
    }

    out.close("saml:Assertion")
}

fn write_issuer<W: Write>(out: &mut XmlOut<W>, issuer: &Issuer) -> SamlResult<()> {
    let mut attrs = Vec::with_capacity(1);
    if let Some(format) = &issuer.format {
        attrs.push(("Format", format.as_str()));
    }
    out.leaf("saml:Issuer", &attrs, &issuer.value)
}

fn write_name_id<W: Write>(out: &mut XmlOut<W>, name_id: &NameId) -> SamlResult<()> {
    let attrs: Vec<(&str, &str)> = [
        ("Format", &name_id.format),
        ("NameQualifier", &name_id.name_qualifier),
        ("SPNameQualifier", &name_id.sp_name_qualifier),
        ("SPProvidedID", &name_id.sp_provided_id),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    .collect();

    out.leaf("saml:NameID", &attrs, &name_id.value)
}

fn write_conditions<W: Write>(out: &mut XmlOut<W>, conditions: &Conditions) -> SamlResult<()> {
    let not_before = format_instant(&conditions.not_before);
    let not_on_or_after = format_instant(&conditions.not_on_or_after);
    out.open(
        "saml:Conditions",
        &[
            ("NotBefore", not_before.as_str()),
            ("NotOnOrAfter", not_on_or_after.as_str()),
        ],
    )?;
    for restriction in &conditions.audience_restrictions {
        out.open("saml:AudienceRestriction", &[])?;
        for audience in &restriction.audiences {
            out.leaf("saml:Audience", &[], audience)?;
        }
        out.close("saml:AudienceRestriction")?;
    }
    out.close("saml:Conditions")
}

fn write_attribute<W: Write>(out: &mut XmlOut<W>, attribute: &Attribute) -> SamlResult<()> {
    let mut attrs = Vec::with_capacity(3);
    if let Some(friendly) = &attribute.friendly_name {
        attrs.push(("FriendlyName", friendly.as_str()));
    }
    attrs.push(("Name", attribute.name.as_str()));
    if let Some(format) = &attribute.name_format {
        attrs.push(("NameFormat", format.as_str()));
    }

    out.open("saml:Attribute", &attrs)?;
    for value in &attribute.values {
        out.leaf("saml:AttributeValue", &[], value)?;
    }
    out.close("saml:Attribute")
}

fn write_signature<W: Write>(out: &mut XmlOut<W>, signature: &XmlSignature) -> SamlResult<()> {
    out.open("ds:Signature", &[("xmlns:ds", XMLDSIG_NS)])?;
    out.raw(&signature.signed_info())?;
    out.leaf("ds:SignatureValue", &[], &signature.signature_value)?;
    if let Some(certificate) = &signature.x509_certificate {
        out.open("ds:KeyInfo", &[])?;
        out.open("ds:X509Data", &[])?;
        out.leaf("ds:X509Certificate", &[], certificate)?;
        out.close("ds:X509Data")?;
        out.close("ds:KeyInfo")?;
    }
    out.close("ds:Signature")
}
