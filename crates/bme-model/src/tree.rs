//! In-memory XML tree exchanged with the XML reader/writer.
//!
//! The tree carries already-decoded values. Escaping, encodings and byte
//! positions belong to the reader/writer; nothing here touches I/O.

/// A single `name="value"` pair. Order inside an element is the read order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `xmlns` and `xmlns:*` declarations carry no data of their own.
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// Child content of an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Replaces the value in place when the attribute exists, appends otherwise.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(position).value)
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    pub fn push_comment(&mut self, comment: impl Into<String>) {
        self.children.push(XmlNode::Comment(comment.into()));
    }

    /// Child elements in document order, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn first_element(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Concatenated text children, `None` when the element has no text node at all.
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in &self.children {
            if let XmlNode::Text(fragment) = child {
                text.get_or_insert_with(String::new).push_str(fragment);
            }
        }
        text
    }

    /// True when some text child contains a non-whitespace character.
    pub fn has_text_content(&self) -> bool {
        self.children.iter().any(|child| match child {
            XmlNode::Text(text) => !text.trim().is_empty(),
            _ => false,
        })
    }

    /// Attributes other than namespace declarations.
    pub fn meaningful_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|attr| !attr.is_namespace_declaration())
    }
}

/// The `<?xml ...?>` prolog, kept so a rewrite can reproduce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("utf-8".to_string()),
            standalone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            declaration: None,
            root,
        }
    }

    #[must_use]
    pub fn with_declaration(mut self, declaration: XmlDeclaration) -> Self {
        self.declaration = Some(declaration);
        self
    }
}
