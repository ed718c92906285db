//! Field-by-field reading of one element inside `from_tree`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::context::ParseContext;
use crate::node::{AnchoredElement, Optional, RoundTripNode, Unknown};
use crate::ordered::{ListVariant, OrderedList};
use crate::scalar::Scalar;
use crate::tree::{XmlElement, XmlNode};

/// Reads declared fields of an element and remembers what was consumed,
/// so `finish` can hand everything else to the passthrough bag.
///
/// ```
/// use bme_model::{NodeReader, ParseContext, XmlElement};
///
/// let element = XmlElement::new("perk").with_attribute("name", "Shield").with_attribute("tier", "2");
/// let mut ctx = ParseContext::new();
/// let mut reader = NodeReader::new(&element, &mut ctx);
/// assert_eq!(reader.attr("name").as_deref(), Some("Shield"));
/// let unknown = reader.finish();
/// assert_eq!(unknown.attributes[0].name, "tier");
/// ```
pub struct NodeReader<'a> {
    element: &'a XmlElement,
    ctx: &'a mut ParseContext,
    consumed_attributes: Vec<bool>,
    consumed_children: Vec<bool>,
    text_consumed: bool,
}

impl<'a> NodeReader<'a> {
    pub fn new(element: &'a XmlElement, ctx: &'a mut ParseContext) -> Self {
        Self {
            element,
            consumed_attributes: vec![false; element.attributes.len()],
            consumed_children: vec![false; element.children.len()],
            ctx,
            text_consumed: false,
        }
    }

    pub fn element(&self) -> &XmlElement {
        self.element
    }

    pub fn ctx(&mut self) -> &mut ParseContext {
        self.ctx
    }

    /// A declared string attribute; `None` when absent.
    pub fn attr(&mut self, name: &str) -> Option<String> {
        let position = self
            .element
            .attributes
            .iter()
            .position(|attr| attr.name == name)?;
        self.consumed_attributes[position] = true;
        Some(self.element.attributes[position].value.clone())
    }

    /// A declared typed attribute. Malformed text is recorded as a
    /// `ParseError` and kept raw.
    pub fn scalar<T>(&mut self, name: &str) -> Option<Scalar<T>>
    where
        T: FromStr + fmt::Display,
    {
        let raw = self.attr(name)?;
        let scalar = Scalar::<T>::parse(raw);
        if !scalar.is_valid() {
            self.ctx.record(name, scalar.raw(), short_type_name::<T>());
        }
        Some(scalar)
    }

    /// Text content of a leaf element.
    pub fn text(&mut self) -> Option<String> {
        self.text_consumed = true;
        self.element.text()
    }

    /// First child with `T::TAG`, classified and parsed. Later duplicates
    /// stay unconsumed and survive as passthrough.
    pub fn optional<T: RoundTripNode>(&mut self) -> Optional<T> {
        let child = self.next_unconsumed(T::TAG).map(|(index, child)| {
            self.consumed_children[index] = true;
            child
        });
        Optional::from_child(child, self.ctx)
    }

    /// Every child with `T::TAG`, in document order.
    pub fn repeated<T: RoundTripNode>(&mut self) -> Vec<T> {
        let mut nodes = Vec::new();
        while let Some((index, child)) = self.next_unconsumed(T::TAG) {
            self.consumed_children[index] = true;
            nodes.push(self.ctx.parse::<T>(child));
        }
        nodes
    }

    /// Every remaining child element as one ordered heterogeneous list.
    /// Tags the variant set does not know become opaque entries.
    pub fn ordered<V: ListVariant>(&mut self) -> OrderedList<V> {
        let element = self.element;
        let mut remaining = Vec::new();
        for (index, node) in element.children.iter().enumerate() {
            if let XmlNode::Element(child) = node
                && !self.consumed_children[index]
            {
                self.consumed_children[index] = true;
                remaining.push(child);
            }
        }
        OrderedList::from_tree(remaining, self.ctx)
    }

    /// Collects whatever was not read as the node's passthrough content.
    pub fn finish(self) -> Unknown {
        let mut unknown = Unknown::default();
        for (attr, consumed) in self
            .element
            .attributes
            .iter()
            .zip(&self.consumed_attributes)
        {
            if !consumed {
                unknown.attributes.push(attr.clone());
            }
        }

        let mut anchor: Option<(String, usize)> = None;
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (node, consumed) in self.element.children.iter().zip(&self.consumed_children) {
            let XmlNode::Element(child) = node else {
                continue;
            };
            if *consumed {
                let count = seen.entry(child.name.as_str()).or_default();
                anchor = Some((child.name.clone(), *count));
                *count += 1;
            } else {
                let (tag, occurrence) = anchor.clone().unzip();
                unknown.children.push(AnchoredElement {
                    anchor: tag,
                    occurrence: occurrence.unwrap_or_default(),
                    element: child.clone(),
                });
            }
        }

        if !self.text_consumed && self.element.has_text_content() {
            unknown.text = self.element.text();
        }
        unknown
    }

    fn next_unconsumed(&self, tag: &str) -> Option<(usize, &'a XmlElement)> {
        let element: &'a XmlElement = self.element;
        element
            .children
            .iter()
            .enumerate()
            .find_map(|(index, node)| match node {
                XmlNode::Element(child) if child.name == tag && !self.consumed_children[index] => {
                    Some((index, child))
                }
                _ => None,
            })
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
