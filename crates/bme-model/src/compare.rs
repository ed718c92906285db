//! Structural comparison of XML trees.
//!
//! Attributes compare as a set, child elements in order, text trimmed.
//! Comments and whitespace-only text are ignored.

use serde::Serialize;
use std::fmt;

use crate::tree::XmlElement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifferenceKind {
    Name { expected: String, found: String },
    MissingAttribute { name: String },
    ExtraAttribute { name: String },
    AttributeValue {
        name: String,
        expected: String,
        found: String,
    },
    Text {
        expected: Option<String>,
        found: Option<String>,
    },
    ChildCount { expected: usize, found: usize },
}

/// One mismatch, located by element path (`root/a[1]/b[0]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub path: String,
    #[serde(flatten)]
    pub kind: DifferenceKind,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DifferenceKind::Name { expected, found } => {
                write!(f, "{}: expected <{expected}>, found <{found}>", self.path)
            }
            DifferenceKind::MissingAttribute { name } => {
                write!(f, "{}: attribute {name} missing", self.path)
            }
            DifferenceKind::ExtraAttribute { name } => {
                write!(f, "{}: unexpected attribute {name}", self.path)
            }
            DifferenceKind::AttributeValue {
                name,
                expected,
                found,
            } => write!(
                f,
                "{}@{name}: expected {expected:?}, found {found:?}",
                self.path
            ),
            DifferenceKind::Text { expected, found } => {
                write!(f, "{}: text {expected:?} became {found:?}", self.path)
            }
            DifferenceKind::ChildCount { expected, found } => write!(
                f,
                "{}: expected {expected} child element(s), found {found}",
                self.path
            ),
        }
    }
}

/// Every structural difference between `expected` and `found`.
pub fn structural_diff(expected: &XmlElement, found: &XmlElement) -> Vec<Difference> {
    let mut differences = Vec::new();
    diff_into(expected, found, expected.name.clone(), &mut differences);
    differences
}

pub fn structurally_equal(expected: &XmlElement, found: &XmlElement) -> bool {
    structural_diff(expected, found).is_empty()
}

fn diff_into(expected: &XmlElement, found: &XmlElement, path: String, out: &mut Vec<Difference>) {
    let mut push = |kind: DifferenceKind| {
        out.push(Difference {
            path: path.clone(),
            kind,
        });
    };

    if expected.name != found.name {
        push(DifferenceKind::Name {
            expected: expected.name.clone(),
            found: found.name.clone(),
        });
        return;
    }

    for attr in &expected.attributes {
        match found.attribute(&attr.name) {
            None => push(DifferenceKind::MissingAttribute {
                name: attr.name.clone(),
            }),
            Some(value) if value != attr.value => push(DifferenceKind::AttributeValue {
                name: attr.name.clone(),
                expected: attr.value.clone(),
                found: value.to_string(),
            }),
            Some(_) => {}
        }
    }
    for attr in &found.attributes {
        if expected.attribute(&attr.name).is_none() {
            push(DifferenceKind::ExtraAttribute {
                name: attr.name.clone(),
            });
        }
    }

    let expected_text = normalized_text(expected);
    let found_text = normalized_text(found);
    if expected_text != found_text {
        push(DifferenceKind::Text {
            expected: expected_text,
            found: found_text,
        });
    }

    let expected_children: Vec<&XmlElement> = expected.elements().collect();
    let found_children: Vec<&XmlElement> = found.elements().collect();
    if expected_children.len() != found_children.len() {
        push(DifferenceKind::ChildCount {
            expected: expected_children.len(),
            found: found_children.len(),
        });
    }
    for (index, (left, right)) in expected_children.iter().zip(&found_children).enumerate() {
        diff_into(left, right, format!("{path}/{}[{index}]", left.name), out);
    }
}

fn normalized_text(element: &XmlElement) -> Option<String> {
    element
        .text()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_order_and_whitespace_are_ignored() {
        let left = XmlElement::new("a")
            .with_attribute("x", "1")
            .with_attribute("y", "2")
            .with_text("  ");
        let right = XmlElement::new("a")
            .with_attribute("y", "2")
            .with_attribute("x", "1");
        assert!(structurally_equal(&left, &right));
    }

    #[test]
    fn reports_child_order_drift() {
        let left = XmlElement::new("r")
            .with_child(XmlElement::new("a"))
            .with_child(XmlElement::new("b"));
        let right = XmlElement::new("r")
            .with_child(XmlElement::new("b"))
            .with_child(XmlElement::new("a"));
        let differences = structural_diff(&left, &right);
        assert_eq!(differences.len(), 2);
        assert_eq!(differences[0].path, "r/a[0]");
        assert!(differences[0].to_string().contains("expected <a>"));
    }
}
