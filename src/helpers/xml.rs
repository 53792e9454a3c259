//! XML parsing utilities for WordprocessingML package parts
//! Provides XML reader wrapper and helper traits for attribute and text processing

use crate::error::RustyDocxError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub(crate) enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for streaming package parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader. Empty elements are expanded into start/end pairs so
    /// that element nesting can be tracked with start and end events only.
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = true;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event from the reader
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RustyDocxError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RustyDocxError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes providing convenient value extraction
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, RustyDocxError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, RustyDocxError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML nodes providing attribute access methods
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an attribute value by its qualified name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyDocxError>;

    /// Gets an attribute value by local name, whatever namespace prefix the producer chose
    fn get_local_attribute_value(&'a self, local_name: &str) -> Result<Option<Cow<'a, str>>, RustyDocxError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyDocxError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }

    fn get_local_attribute_value(&'a self, local_name: &str) -> Result<Option<Cow<'a, str>>, RustyDocxError> {
        for result in self.attributes() {
            let attribute = result?;
            if attribute.key.local_name().as_ref() == local_name.as_bytes() {
                return attribute.get_value().map(Some);
            }
        }
        Ok(None)
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from BytesText event
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), RustyDocxError>;

    /// Appends text content from BytesRef event (handles entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyDocxError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), RustyDocxError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyDocxError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_xml_events;

    fn collect_text(xml: &str) -> Result<String, RustyDocxError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_bytes_text(&event)?,
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn test_text_with_entities_and_character_references() {
        let text = collect_text("<t>a &amp; b &#65;&#x42; &lt;c&gt;</t>").unwrap();
        assert_eq!(text, "a & b AB <c>");
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        assert!(collect_text("<t>&bogus;</t>").is_err());
    }

    #[test]
    fn test_local_attribute_lookup_ignores_prefix() -> Result<(), RustyDocxError> {
        let mut reader = XmlReader::new(r#"<w:br w:type="page"/>"#.as_bytes());
        let mut kind = None;
        match_xml_events!(reader => {
            Event::Start(event) => kind = event.get_local_attribute_value("type")?.map(|value| value.into_owned()),
        });
        assert_eq!(kind.as_deref(), Some("page"));
        Ok(())
    }
}
