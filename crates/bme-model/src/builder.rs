//! Field-by-field writing of one element inside `to_tree`.

use std::fmt;
use std::str::FromStr;

use crate::node::{Optional, RoundTripNode, Unknown};
use crate::ordered::{ListVariant, OrderedList};
use crate::scalar::Scalar;
use crate::tree::{XmlElement, XmlNode};

/// Emits declared content in call order, then merges the passthrough bag
/// back in with `finish`.
#[derive(Debug)]
pub struct ElementBuilder {
    element: XmlElement,
}

impl ElementBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            element: XmlElement::new(tag),
        }
    }

    /// Writes the attribute only when a value is present.
    #[must_use]
    pub fn attr(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.element.set_attribute(name, value);
        }
        self
    }

    /// Writes the scalar's raw text, never a re-rendered value.
    #[must_use]
    pub fn scalar<T>(self, name: &str, value: Option<&Scalar<T>>) -> Self
    where
        T: FromStr + fmt::Display,
    {
        self.attr(name, value.map(Scalar::raw))
    }

    #[must_use]
    pub fn text(mut self, text: Option<&str>) -> Self {
        if let Some(text) = text {
            self.element.push_text(text);
        }
        self
    }

    #[must_use]
    pub fn optional<T: RoundTripNode>(mut self, slot: &Optional<T>) -> Self {
        if let Some(child) = slot.emit() {
            self.element.push_child(child);
        }
        self
    }

    #[must_use]
    pub fn repeated<T: RoundTripNode>(mut self, nodes: &[T]) -> Self {
        for node in nodes {
            self.element.push_child(node.to_tree());
        }
        self
    }

    #[must_use]
    pub fn ordered<V: ListVariant>(mut self, list: &OrderedList<V>) -> Self {
        for (_, child) in list.to_ordered_tree() {
            self.element.push_child(child);
        }
        self
    }

    #[must_use]
    pub fn child(mut self, child: XmlElement) -> Self {
        self.element.push_child(child);
        self
    }

    /// Appends undeclared attributes after the declared ones and puts each
    /// undeclared child back behind its anchor sibling.
    ///
    /// An anchor that no longer exists (its sibling was edited away) falls
    /// back to the last sibling with the same tag, then to the end.
    pub fn finish(mut self, unknown: &Unknown) -> XmlElement {
        for attr in &unknown.attributes {
            if self.element.attribute(&attr.name).is_none() {
                self.element.attributes.push(attr.clone());
            }
        }

        if unknown.children.is_empty() && unknown.text.is_none() {
            return self.element;
        }

        let declared = std::mem::take(&mut self.element.children);
        let mut leading = Vec::new();
        let mut trailing = Vec::new();
        let mut after: Vec<Vec<XmlElement>> = vec![Vec::new(); declared.len()];

        for anchored in &unknown.children {
            let slot = anchored
                .anchor
                .as_deref()
                .and_then(|tag| anchor_position(&declared, tag, anchored.occurrence));
            match (&anchored.anchor, slot) {
                (None, _) => leading.push(anchored.element.clone()),
                (Some(_), Some(position)) => after[position].push(anchored.element.clone()),
                (Some(_), None) => trailing.push(anchored.element.clone()),
            }
        }

        let mut children = Vec::with_capacity(declared.len() + unknown.children.len() + 1);
        if let Some(text) = &unknown.text
            && !declared.iter().any(|node| matches!(node, XmlNode::Text(_)))
        {
            children.push(XmlNode::Text(text.clone()));
        }
        children.extend(leading.into_iter().map(XmlNode::Element));
        for (node, followers) in declared.into_iter().zip(after) {
            children.push(node);
            children.extend(followers.into_iter().map(XmlNode::Element));
        }
        children.extend(trailing.into_iter().map(XmlNode::Element));

        self.element.children = children;
        self.element
    }
}

/// Index in `children` of the `occurrence`-th element named `tag`, or of
/// the last one when fewer exist.
fn anchor_position(children: &[XmlNode], tag: &str, occurrence: usize) -> Option<usize> {
    let mut last = None;
    let mut seen = 0;
    for (index, node) in children.iter().enumerate() {
        if let XmlNode::Element(element) = node
            && element.name == tag
        {
            if seen == occurrence {
                return Some(index);
            }
            seen += 1;
            last = Some(index);
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AnchoredElement;
    use crate::tree::Attribute;

    #[test]
    fn unknown_attributes_follow_declared_ones() {
        let unknown = Unknown {
            attributes: vec![Attribute::new("extra", "1"), Attribute::new("id", "dup")],
            ..Unknown::default()
        };
        let element = ElementBuilder::new("node")
            .attr("id", Some("a"))
            .attr("missing", None)
            .finish(&unknown);
        let names: Vec<&str> = element.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["id", "extra"]);
        assert_eq!(element.attribute("id"), Some("a"));
    }

    #[test]
    fn unknown_children_return_behind_their_anchor() {
        let unknown = Unknown {
            children: vec![
                AnchoredElement {
                    anchor: None,
                    occurrence: 0,
                    element: XmlElement::new("first"),
                },
                AnchoredElement {
                    anchor: Some("item".into()),
                    occurrence: 0,
                    element: XmlElement::new("between"),
                },
                AnchoredElement {
                    anchor: Some("gone".into()),
                    occurrence: 0,
                    element: XmlElement::new("orphan"),
                },
            ],
            ..Unknown::default()
        };
        let element = ElementBuilder::new("node")
            .child(XmlElement::new("item"))
            .child(XmlElement::new("item"))
            .child(XmlElement::new("tail"))
            .finish(&unknown);
        let tags: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(tags, ["first", "item", "between", "item", "tail", "orphan"]);
    }
}
