//! `AttributeQuery` decoding.
//!
//! Elements are matched on local name and position:
//! `Envelope/Body/AttributeQuery`, its `Issuer`, and `Subject/NameID`.
//! SOAP headers and any extension elements are skipped.
//!
//! Text is kept exactly as sent. Only the content of a leaf's own start and
//! end tags is captured, so indentation between elements never leaks in.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{SamlError, SamlResult};
use crate::types::{AttributeQuery, NameId};

const QUERY_PATH: [&str; 2] = ["Envelope", "Body"];
const ISSUER_PARENT: [&str; 3] = ["Envelope", "Body", "AttributeQuery"];
const NAME_ID_PARENT: [&str; 4] = ["Envelope", "Body", "AttributeQuery", "Subject"];

/// Decodes a SOAP-wrapped `AttributeQuery` from a request body.
///
/// Only well-formedness and presence of the fields the responder needs are
/// checked here. Whether the query is acceptable is decided later.
///
/// # Errors
///
/// Returns [`SamlError::XmlParse`] for malformed XML or an unexpected
/// document shape, and [`SamlError::MissingElement`] when a required element
/// or attribute is absent.
pub fn decode_attribute_query(body: &[u8]) -> SamlResult<AttributeQuery> {
    let xml = std::str::from_utf8(body)
        .map_err(|e| SamlError::XmlParse(format!("request is not valid UTF-8: {e}")))?;

    let mut reader = Reader::from_str(xml);

    let mut decoder = QueryDecoder::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => decoder.start(&e)?,
            Event::Empty(e) => {
                decoder.start(&e)?;
                decoder.end();
            }
            Event::Text(e) => decoder.text.push_str(&e.unescape()?),
            Event::CData(e) => decoder.text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => decoder.end(),
            Event::DocType(_) => {
                return Err(SamlError::XmlParse("DTDs are not accepted".to_string()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    decoder.finish()
}

#[derive(Default)]
struct QueryDecoder {
    path: Vec<String>,
    seen_root: bool,
    seen_query: bool,
    id: Option<String>,
    version: Option<String>,
    issue_instant: Option<String>,
    issuer: Option<String>,
    name_id: Option<NameId>,
    text: String,
}

impl QueryDecoder {
    fn start(&mut self, e: &BytesStart<'_>) -> SamlResult<()> {
        let name = local_name(e.local_name().as_ref())?;

        if self.path.is_empty() {
            if self.seen_root {
                return Err(SamlError::XmlParse("multiple root elements".to_string()));
            }
            if name != "Envelope" {
                return Err(SamlError::XmlParse(format!(
                    "expected SOAP Envelope, found <{name}>"
                )));
            }
            self.seen_root = true;
        }

        if self.path == QUERY_PATH && name == "AttributeQuery" {
            if self.seen_query {
                return Err(SamlError::XmlParse(
                    "more than one AttributeQuery in body".to_string(),
                ));
            }
            self.seen_query = true;
            for (key, value) in attributes(e)? {
                match key.as_str() {
                    "ID" => self.id = Some(value),
                    "Version" => self.version = Some(value),
                    "IssueInstant" => self.issue_instant = Some(value),
                    _ => {}
                }
            }
        } else if self.path == NAME_ID_PARENT && name == "NameID" {
            let mut name_id = NameId::new(String::new());
            for (key, value) in attributes(e)? {
                match key.as_str() {
                    "Format" => name_id.format = Some(value),
                    "NameQualifier" => name_id.name_qualifier = Some(value),
                    "SPNameQualifier" => name_id.sp_name_qualifier = Some(value),
                    "SPProvidedID" => name_id.sp_provided_id = Some(value),
                    _ => {}
                }
            }
            self.name_id = Some(name_id);
        }

        self.path.push(name);
        self.text.clear();
        Ok(())
    }

    fn end(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };

        if self.path == ISSUER_PARENT && name == "Issuer" {
            self.issuer = Some(std::mem::take(&mut self.text));
        } else if self.path == NAME_ID_PARENT && name == "NameID" {
            if let Some(name_id) = self.name_id.as_mut() {
                name_id.value = std::mem::take(&mut self.text);
            }
        }
        self.text.clear();
    }

    fn finish(self) -> SamlResult<AttributeQuery> {
        if let Some(open) = self.path.last() {
            return Err(SamlError::XmlParse(format!(
                "unexpected end of document inside <{open}>"
            )));
        }
        if !self.seen_root {
            return Err(SamlError::XmlParse("empty request body".to_string()));
        }
        if !self.seen_query {
            return Err(SamlError::MissingElement("AttributeQuery".to_string()));
        }

        let id = self
            .id
            .ok_or_else(|| SamlError::MissingElement("AttributeQuery ID".to_string()))?;
        let issuer = self
            .issuer
            .ok_or_else(|| SamlError::MissingElement("Issuer".to_string()))?;
        let name_id = self
            .name_id
            .ok_or_else(|| SamlError::MissingElement("Subject/NameID".to_string()))?;

        Ok(AttributeQuery {
            id,
            version: self.version,
            issue_instant: self.issue_instant,
            issuer,
            name_id,
        })
    }
}

fn local_name(raw: &[u8]) -> SamlResult<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| SamlError::XmlParse(format!("invalid element name: {e}")))
}

/// Collects non-namespace attributes as `(local name, unescaped value)`.
fn attributes(e: &BytesStart<'_>) -> SamlResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = local_name(attr.key.local_name().as_ref())?;
        out.push((key, attr.unescape_value()?.into_owned()));
    }
    Ok(out)
}
