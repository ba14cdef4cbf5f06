//! XML wire codec.
//!
//! [`decode_attribute_query`] reads the SOAP-wrapped query off the request
//! body; [`ResponseEncoder`] streams the signed response back out. Output is
//! written in exclusive canonical layout (attributes in lexical order,
//! explicit end tags, canonical escaping) so that the bytes digested by the
//! signer are the bytes that reach the relying party.

mod decode;
mod encode;

pub use decode::*;
pub use encode::*;

use std::borrow::Cow;
use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use crate::error::{SamlError, SamlResult};

/// The declaration every response document starts with.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Formats a timestamp as `xs:dateTime` in UTC with millisecond precision.
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Thin element writer over `quick_xml::Writer` producing canonical markup.
pub(crate) struct XmlOut<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlOut<W> {
    pub(crate) fn new(sink: W) -> Self {
        Self {
            writer: Writer::new(sink),
        }
    }

    /// Opens `name`. Attributes must already be in canonical order.
    pub(crate) fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> SamlResult<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in attrs {
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Owned(escape_attribute(value).into_owned().into_bytes()),
            });
        }
        self.event(Event::Start(start))
    }

    pub(crate) fn close(&mut self, name: &str) -> SamlResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn text(&mut self, text: &str) -> SamlResult<()> {
        self.event(Event::Text(BytesText::from_escaped(escape_text(text))))
    }

    /// Writes `<name attrs>text</name>`.
    pub(crate) fn leaf(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> SamlResult<()> {
        self.open(name, attrs)?;
        self.text(text)?;
        self.close(name)
    }

    /// Writes pre-serialized markup verbatim.
    pub(crate) fn raw(&mut self, markup: &str) -> SamlResult<()> {
        self.writer
            .get_mut()
            .write_all(markup.as_bytes())
            .map_err(|e| SamlError::Encoding(e.to_string()))
    }

    pub(crate) fn flush(&mut self) -> SamlResult<()> {
        self.writer
            .get_mut()
            .flush()
            .map_err(|e| SamlError::Encoding(e.to_string()))
    }

    pub(crate) fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn event(&mut self, event: Event<'_>) -> SamlResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| SamlError::Encoding(e.to_string()))
    }
}

/// Escapes text content the way exclusive C14N renders it.
fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '\r']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#xD;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Escapes an attribute value the way exclusive C14N renders it.
fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '"', '\t', '\n', '\r']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            '\t' => escaped.push_str("&#x9;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
