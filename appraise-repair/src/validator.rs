//! HITs file validation
//!
//! [`HitsValidator`] is the oracle the repair loop consults. The built-in
//! [`WmtHitsValidator`] checks well-formedness and the expected layout:
//!
//! ```text
//! <hits>
//!   <hit block-id=".." source-language=".." target-language="..">
//!     <seg id="..">
//!       <source>..</source>
//!       <reference>..</reference>              (optional)
//!       <translation system="..">..</translation>  (one or more)
//!     </seg>
//!   </hit>
//! </hits>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

/// Document rejected by a validator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn at(position: u64, message: impl std::fmt::Display) -> Self {
        Self::new(format!("at byte {}: {}", position, message))
    }
}

/// Validation oracle for HITs XML text
pub trait HitsValidator {
    fn validate(&self, xml: &str) -> Result<(), ValidationError>;
}

impl<F> HitsValidator for F
where
    F: Fn(&str) -> Result<(), ValidationError>,
{
    fn validate(&self, xml: &str) -> Result<(), ValidationError> {
        self(xml)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Hits,
    Hit,
    Seg,
    Source,
    Reference,
    Translation,
}

impl Element {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"hits" => Some(Element::Hits),
            b"hit" => Some(Element::Hit),
            b"seg" => Some(Element::Seg),
            b"source" => Some(Element::Source),
            b"reference" => Some(Element::Reference),
            b"translation" => Some(Element::Translation),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Element::Hits => "hits",
            Element::Hit => "hit",
            Element::Seg => "seg",
            Element::Source => "source",
            Element::Reference => "reference",
            Element::Translation => "translation",
        }
    }

    fn parent(&self) -> Option<Element> {
        match self {
            Element::Hits => None,
            Element::Hit => Some(Element::Hits),
            Element::Seg => Some(Element::Hit),
            Element::Source | Element::Reference | Element::Translation => Some(Element::Seg),
        }
    }

    fn holds_text(&self) -> bool {
        matches!(self, Element::Source | Element::Reference | Element::Translation)
    }

    fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            Element::Hit => &["block-id", "source-language", "target-language"],
            Element::Seg => &["id"],
            Element::Translation => &["system"],
            _ => &[],
        }
    }
}

/// Child counts of the element currently open at each level
#[derive(Debug, Default)]
struct Frame {
    hits: usize,
    segs: usize,
    sources: usize,
    references: usize,
    translations: usize,
}

/// Built-in validator for WMT HITs files
#[derive(Debug, Default, Clone, Copy)]
pub struct WmtHitsValidator;

impl WmtHitsValidator {
    pub fn new() -> Self {
        Self
    }

    fn open(
        &self,
        start: &BytesStart<'_>,
        stack: &mut Vec<(Element, Frame)>,
        seen_root: &mut bool,
        position: u64,
    ) -> Result<Element, ValidationError> {
        let raw_name = start.name();
        let element = Element::from_name(raw_name.as_ref()).ok_or_else(|| {
            ValidationError::at(
                position,
                format!("unexpected element <{}>", String::from_utf8_lossy(raw_name.as_ref())),
            )
        })?;

        let parent = stack.last().map(|(el, _)| *el);
        if parent != element.parent() {
            let context = match parent {
                Some(p) => format!("inside <{}>", p.name()),
                None => "at document root".to_string(),
            };
            return Err(ValidationError::at(
                position,
                format!("<{}> not allowed {}", element.name(), context),
            ));
        }

        if element == Element::Hits {
            if *seen_root {
                return Err(ValidationError::at(position, "multiple root elements"));
            }
            *seen_root = true;
        }

        let mut present = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                ValidationError::at(position, format!("bad attribute on <{}>: {}", element.name(), e))
            })?;
            attr.unescape_value().map_err(|e| {
                ValidationError::at(
                    position,
                    format!(
                        "bad value for attribute {} on <{}>: {}",
                        String::from_utf8_lossy(attr.key.as_ref()),
                        element.name(),
                        e
                    ),
                )
            })?;
            present.push(String::from_utf8_lossy(attr.key.as_ref()).into_owned());
        }
        for required in element.required_attributes() {
            if !present.iter().any(|p| p == required) {
                return Err(ValidationError::at(
                    position,
                    format!("<{}> missing required attribute {}", element.name(), required),
                ));
            }
        }

        if let Some((_, frame)) = stack.last_mut() {
            match element {
                Element::Hit => frame.hits += 1,
                Element::Seg => frame.segs += 1,
                Element::Source => frame.sources += 1,
                Element::Reference => frame.references += 1,
                Element::Translation => frame.translations += 1,
                Element::Hits => {}
            }
        }

        Ok(element)
    }

    fn close(element: Element, frame: &Frame, position: u64) -> Result<(), ValidationError> {
        let problem = match element {
            Element::Hits if frame.hits == 0 => Some("<hits> contains no <hit>".to_string()),
            Element::Hit if frame.segs == 0 => Some("<hit> contains no <seg>".to_string()),
            Element::Seg if frame.sources != 1 => Some(format!(
                "<seg> must contain exactly one <source>, found {}",
                frame.sources
            )),
            Element::Seg if frame.references > 1 => Some(format!(
                "<seg> contains {} <reference> elements",
                frame.references
            )),
            Element::Seg if frame.translations == 0 => {
                Some("<seg> contains no <translation>".to_string())
            }
            _ => None,
        };

        match problem {
            Some(message) => Err(ValidationError::at(position, message)),
            None => Ok(()),
        }
    }

    fn check_text(
        stack: &[(Element, Frame)],
        has_content: bool,
        position: u64,
    ) -> Result<(), ValidationError> {
        if !has_content {
            return Ok(());
        }
        match stack.last() {
            Some((element, _)) if element.holds_text() => Ok(()),
            Some((element, _)) => Err(ValidationError::at(
                position,
                format!("unexpected text inside <{}>", element.name()),
            )),
            None => Err(ValidationError::at(position, "text outside the root element")),
        }
    }
}

impl HitsValidator for WmtHitsValidator {
    fn validate(&self, xml: &str) -> Result<(), ValidationError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<(Element, Frame)> = Vec::new();
        let mut seen_root = false;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| {
                ValidationError::at(reader.buffer_position() as u64, format!("malformed XML: {}", e))
            })?;

            match event {
                Event::Start(start) => {
                    let element = self.open(&start, &mut stack, &mut seen_root, position)?;
                    stack.push((element, Frame::default()));
                }
                Event::Empty(start) => {
                    let element = self.open(&start, &mut stack, &mut seen_root, position)?;
                    Self::close(element, &Frame::default(), position)?;
                }
                Event::End(end) => {
                    let (element, frame) = stack.pop().ok_or_else(|| {
                        ValidationError::at(position, "closing tag without matching opening tag")
                    })?;
                    if end.name().as_ref() != element.name().as_bytes() {
                        return Err(ValidationError::at(
                            position,
                            format!(
                                "expected </{}>, found </{}>",
                                element.name(),
                                String::from_utf8_lossy(end.name().as_ref())
                            ),
                        ));
                    }
                    Self::close(element, &frame, position)?;
                }
                Event::Text(text) => {
                    let unescaped = text.unescape().map_err(|e| {
                        ValidationError::at(position, format!("invalid character data: {}", e))
                    })?;
                    Self::check_text(&stack, !unescaped.trim().is_empty(), position)?;
                }
                Event::CData(cdata) => {
                    let has_content = cdata.iter().any(|b| !b.is_ascii_whitespace());
                    Self::check_text(&stack, has_content, position)?;
                }
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some((element, _)) = stack.last() {
            return Err(ValidationError::at(
                xml.len() as u64,
                format!("unexpected end of document, <{}> still open", element.name()),
            ));
        }
        if !seen_root {
            return Err(ValidationError::new("document has no <hits> root element"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<hits>
  <hit block-id="1" source-language="deu" target-language="eng">
    <seg id="1">
      <source>{}</source>
      <reference>The department.</reference>
      <translation system="uedin">The department.</translation>
      <translation system="online-B">Department.</translation>
    </seg>
  </hit>
</hits>
"#,
            source
        )
    }

    #[test]
    fn test_valid_document() {
        let validator = WmtHitsValidator::new();
        assert_eq!(validator.validate(&doc("Die Abteilung.")), Ok(()));
        assert_eq!(validator.validate(&doc("Tom &amp; Jerry &#169;")), Ok(()));
    }

    #[test]
    fn test_bare_ampersand_rejected() {
        let validator = WmtHitsValidator::new();
        assert!(validator.validate(&doc("Die R&D Abteilung.")).is_err());
        assert!(validator.validate(&doc("Salt & pepper")).is_err());
    }

    #[test]
    fn test_stray_tag_rejected() {
        let validator = WmtHitsValidator::new();
        assert!(validator.validate(&doc("in der <службе Abteilung")).is_err());
    }

    #[test]
    fn test_wrong_root_rejected() {
        let validator = WmtHitsValidator::new();
        let err = validator
            .validate("<batch><hit block-id=\"1\" source-language=\"a\" target-language=\"b\"/></batch>")
            .unwrap_err();
        assert!(err.message.contains("<batch>"), "{}", err);
    }

    #[test]
    fn test_missing_attribute_rejected() {
        let validator = WmtHitsValidator::new();
        let xml = doc("ok").replace(" block-id=\"1\"", "");
        let err = validator.validate(&xml).unwrap_err();
        assert!(err.message.contains("block-id"), "{}", err);
    }

    #[test]
    fn test_seg_without_translation_rejected() {
        let validator = WmtHitsValidator::new();
        let xml = r#"<hits><hit block-id="1" source-language="a" target-language="b"><seg id="1"><source>x</source></seg></hit></hits>"#;
        let err = validator.validate(xml).unwrap_err();
        assert!(err.message.contains("no <translation>"), "{}", err);
    }

    #[test]
    fn test_truncated_document_rejected() {
        let validator = WmtHitsValidator::new();
        let xml = doc("ok");
        let cut = &xml[..xml.find("</hit>").unwrap()];
        assert!(validator.validate(cut).is_err());
        assert!(validator.validate("").is_err());
    }

    #[test]
    fn test_closure_validator() {
        let reject_all =
            |_: &str| -> Result<(), ValidationError> { Err(ValidationError::new("nope")) };
        assert_eq!(reject_all.validate("<hits/>"), Err(ValidationError::new("nope")));
    }
}
