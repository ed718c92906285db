//! Serializes [`XmlDocument`] trees with quick-xml.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bme_model::{XmlDocument, XmlElement, XmlNode};
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Result, XmlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub byte: u8,
    pub width: usize,
}

impl Indent {
    pub const fn spaces(width: usize) -> Self {
        Self { byte: b' ', width }
    }

    pub const fn tabs() -> Self {
        Self {
            byte: b'\t',
            width: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// `None` writes everything on one line.
    pub indent: Option<Indent>,
    pub trailing_newline: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: Some(Indent::spaces(2)),
            trailing_newline: false,
        }
    }
}

impl WriteOptions {
    pub fn compact() -> Self {
        Self {
            indent: None,
            trailing_newline: false,
        }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Option<Indent>) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_trailing_newline(mut self, enabled: bool) -> Self {
        self.trailing_newline = enabled;
        self
    }

    /// Options that reproduce the layout of `source`: its indentation unit
    /// and whether it ends with a newline.
    pub fn matching(source: &str) -> Self {
        Self {
            indent: detect_indent(source),
            trailing_newline: source.ends_with('\n'),
        }
    }
}

/// Indentation unit of the first indented tag line, if any.
pub fn detect_indent(source: &str) -> Option<Indent> {
    source.lines().skip(1).find_map(|line| {
        let trimmed = line.trim_start_matches([' ', '\t']);
        let leading = &line[..line.len() - trimmed.len()];
        if leading.is_empty() || !trimmed.starts_with('<') {
            return None;
        }
        if leading.starts_with('\t') {
            Some(Indent::tabs())
        } else {
            Some(Indent::spaces(leading.len()))
        }
    })
}

pub fn write_document<W: Write>(document: &XmlDocument, sink: W, options: WriteOptions) -> Result<()> {
    let mut writer = match options.indent {
        Some(indent) => Writer::new_with_indent(sink, indent.byte, indent.width),
        None => Writer::new(sink),
    };
    if let Some(declaration) = &document.declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            &declaration.version,
            declaration.encoding.as_deref(),
            declaration.standalone.as_deref(),
        )))?;
    }
    write_element(&mut writer, &document.root)?;
    if options.trailing_newline {
        writer.get_mut().write_all(b"\n")?;
    }
    Ok(())
}

pub fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        let value = escape_attribute_value(&attr.value);
        start.push_attribute((attr.name.as_bytes(), value.as_bytes()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
            }
            XmlNode::Comment(comment) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Escapes what a double-quoted attribute value cannot hold literally.
/// Apostrophes and `>` are written as is.
fn escape_attribute_value(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '"']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

pub fn to_bytes(document: &XmlDocument, options: WriteOptions) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_document(document, &mut buffer, options)?;
    Ok(buffer)
}

pub fn to_string(document: &XmlDocument, options: WriteOptions) -> Result<String> {
    let bytes = to_bytes(document, options)?;
    String::from_utf8(bytes)
        .map_err(|err| XmlError::Write(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

/// A single element without declaration, for fragments and tests.
pub fn element_to_string(element: &XmlElement, options: WriteOptions) -> Result<String> {
    to_string(&XmlDocument::new(element.clone()), options)
}

pub fn write_file(path: &Path, document: &XmlDocument, options: WriteOptions) -> Result<()> {
    let file = File::create(path).map_err(|err| XmlError::io(path, err))?;
    let mut sink = BufWriter::new(file);
    write_document(document, &mut sink, options)?;
    sink.flush().map_err(|err| XmlError::io(path, err))?;
    tracing::debug!(path = %path.display(), "wrote XML document");
    Ok(())
}
