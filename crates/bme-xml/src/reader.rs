//! Builds [`XmlDocument`] trees from quick-xml events.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bme_model::{Attribute, XmlDeclaration, XmlDocument, XmlElement, XmlNode};
use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesDecl, BytesRef, BytesStart, Event};

use crate::error::{Result, XmlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Keep whitespace-only text between elements. Off by default; the
    /// writer re-creates indentation.
    pub keep_whitespace: bool,
    pub keep_comments: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            keep_whitespace: false,
            keep_comments: true,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    #[must_use]
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}

/// Assembles elements from a stream of events.
///
/// Used for whole documents and by the streaming reader, which feeds it
/// one root child at a time.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<XmlElement>,
    options: ReadOptions,
}

impl TreeBuilder {
    pub fn new(options: ReadOptions) -> Self {
        Self {
            stack: Vec::new(),
            options,
        }
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// Feeds one event. Returns an element once its closing tag brings the
    /// builder back to depth zero. Declarations, processing instructions
    /// and content outside any element are ignored.
    pub fn feed(
        &mut self,
        event: &Event<'_>,
        decoder: Decoder,
        position: u64,
    ) -> Result<Option<XmlElement>> {
        match event {
            Event::Start(start) => {
                let element = element_from_start(start, decoder, position)?;
                self.stack.push(element);
                Ok(None)
            }
            Event::Empty(start) => {
                let element = element_from_start(start, decoder, position)?;
                Ok(self.attach(element))
            }
            Event::End(end) => {
                let Some(element) = self.stack.pop() else {
                    let end_name = end.name();
                    let name = decoder
                        .decode(end_name.as_ref())
                        .map_err(|err| XmlError::syntax(position, err))?;
                    return Err(XmlError::UnbalancedEnd {
                        name: name.into_owned(),
                        position,
                    });
                };
                Ok(self.attach(element))
            }
            Event::Text(text) => {
                let text = text.decode().map_err(|err| XmlError::syntax(position, err))?;
                self.push_text(&text);
                Ok(None)
            }
            Event::CData(data) => {
                let text = data.decode().map_err(|err| XmlError::syntax(position, err))?;
                self.push_text(&text);
                Ok(None)
            }
            Event::GeneralRef(reference) => {
                let text = resolve_reference(reference, position)?;
                self.push_text(&text);
                Ok(None)
            }
            Event::Comment(comment) => {
                if self.options.keep_comments
                    && let Some(parent) = self.stack.last_mut()
                {
                    let text = comment
                        .decode()
                        .map_err(|err| XmlError::syntax(position, err))?;
                    parent.push_comment(text.into_owned());
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn attach(&mut self, mut element: XmlElement) -> Option<XmlElement> {
        if !self.options.keep_whitespace {
            element.children.retain(|child| match child {
                XmlNode::Text(text) => !text.trim().is_empty(),
                _ => true,
            });
        }
        match self.stack.last_mut() {
            Some(parent) => {
                parent.push_child(element);
                None
            }
            None => Some(element),
        }
    }

    fn push_text(&mut self, text: &str) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        // Entity references split text into several events; rejoin them.
        match parent.children.last_mut() {
            Some(XmlNode::Text(existing)) => existing.push_str(text),
            _ => parent.push_text(text),
        }
    }
}

pub fn parse_str(xml: &str) -> Result<XmlDocument> {
    parse_str_with(xml, ReadOptions::default())
}

pub fn parse_str_with(xml: &str, options: ReadOptions) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(xml);
    read_document(&mut reader, options)
}

pub fn parse_reader<R: BufRead>(source: R, options: ReadOptions) -> Result<XmlDocument> {
    let mut reader = Reader::from_reader(source);
    read_document(&mut reader, options)
}

pub fn read_file(path: &Path, options: ReadOptions) -> Result<XmlDocument> {
    let file = File::open(path).map_err(|err| XmlError::io(path, err))?;
    tracing::debug!(path = %path.display(), "reading XML document");
    parse_reader(BufReader::new(file), options)
}

/// Name of the root element, reading no further than its start tag.
pub fn root_name(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|err| XmlError::io(path, err))?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    let mut buf = Vec::new();
    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| XmlError::syntax(reader.error_position(), err))?;
        match &event {
            Event::Start(start) | Event::Empty(start) => {
                return Ok(element_from_start(start, reader.decoder(), position)?.name);
            }
            Event::Eof => return Err(XmlError::NoRootElement),
            _ => {}
        }
        buf.clear();
    }
}

fn read_document<R: BufRead>(reader: &mut Reader<R>, options: ReadOptions) -> Result<XmlDocument> {
    reader.config_mut().trim_text(false);
    let mut builder = TreeBuilder::new(options);
    let mut declaration = None;
    let mut root = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| XmlError::syntax(reader.error_position(), err))?;
        match &event {
            Event::Eof => break,
            Event::Decl(decl) => declaration = Some(read_declaration(decl, position)?),
            _ => {
                if let Some(element) = builder.feed(&event, reader.decoder(), position)?
                    && root.is_none()
                {
                    root = Some(element);
                }
            }
        }
        buf.clear();
    }

    let root = root.ok_or(XmlError::NoRootElement)?;
    Ok(XmlDocument { declaration, root })
}

/// Decodes a start tag and its attributes, in source order.
pub fn element_from_start(
    start: &BytesStart<'_>,
    decoder: Decoder,
    position: u64,
) -> Result<XmlElement> {
    let start_name = start.name();
    let name = decoder
        .decode(start_name.as_ref())
        .map_err(|err| XmlError::syntax(position, err))?;
    let mut element = XmlElement::new(name.into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|err| XmlError::syntax(position, err))?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|err| XmlError::syntax(position, err))?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|err| XmlError::syntax(position, err))?;
        element
            .attributes
            .push(Attribute::new(key.into_owned(), value.into_owned()));
    }
    Ok(element)
}

pub fn read_declaration(decl: &BytesDecl<'_>, position: u64) -> Result<XmlDeclaration> {
    let version = decl
        .version()
        .map_err(|err| XmlError::syntax(position, err))?;
    let encoding = decl
        .encoding()
        .transpose()
        .map_err(|err| XmlError::syntax(position, err))?;
    let standalone = decl
        .standalone()
        .transpose()
        .map_err(|err| XmlError::syntax(position, err))?;
    Ok(XmlDeclaration {
        version: String::from_utf8_lossy(&version).into_owned(),
        encoding: encoding.map(|value| String::from_utf8_lossy(&value).into_owned()),
        standalone: standalone.map(|value| String::from_utf8_lossy(&value).into_owned()),
    })
}

fn resolve_reference(reference: &BytesRef<'_>, position: u64) -> Result<String> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|err| XmlError::syntax(position, err))?
    {
        return Ok(ch.to_string());
    }
    let name = reference
        .decode()
        .map_err(|err| XmlError::syntax(position, err))?;
    Ok(match quick_xml::escape::resolve_predefined_entity(&name) {
        Some(value) => value.to_string(),
        None => format!("&{name};"),
    })
}
