//! The round-trip node contract and the slots a node is built from.

use crate::context::ParseContext;
use crate::presence::PresenceFlag;
use crate::tree::{Attribute, XmlElement};

/// A schema-faithful domain object for one XML element.
///
/// `from_tree` never fails: malformed scalars are recorded on the context
/// and undeclared content lands in an [`Unknown`] bag. `to_tree` writes
/// declared attributes and children in schema order and re-inserts the
/// passthrough content, so an unedited node reproduces its source.
pub trait RoundTripNode: Sized {
    /// Element name this node reads and writes.
    const TAG: &'static str;

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self;

    fn to_tree(&self) -> XmlElement;

    /// Parses a standalone element with a fresh context.
    fn parse_standalone(element: &XmlElement) -> (Self, crate::Diagnostics) {
        let mut ctx = ParseContext::new();
        let node = ctx.parse::<Self>(element);
        (node, ctx.finish())
    }
}

/// An optional child element together with its presence flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Optional<T> {
    presence: PresenceFlag,
    node: Option<T>,
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> Optional<T> {
    pub fn absent() -> Self {
        Self {
            presence: PresenceFlag::Absent,
            node: None,
        }
    }

    /// Flag as computed at parse time or by the last `refresh`.
    pub fn presence(&self) -> PresenceFlag {
        self.presence
    }

    pub fn is_present(&self) -> bool {
        self.node.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.node.as_ref()
    }

    /// Mutable access; call `refresh` afterwards to update the flag.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.node.as_mut()
    }

    /// Removes the child; it will not be emitted.
    pub fn take(&mut self) -> Option<T> {
        self.presence = PresenceFlag::Absent;
        self.node.take()
    }
}

impl<T: RoundTripNode> Optional<T> {
    /// Classifies and parses a possibly missing child element.
    pub fn from_child(element: Option<&XmlElement>, ctx: &mut ParseContext) -> Self {
        let presence = PresenceFlag::classify(element);
        let node = match element {
            Some(element) if presence.should_emit() => Some(ctx.parse::<T>(element)),
            _ => None,
        };
        Self { presence, node }
    }

    pub fn present(node: T) -> Self {
        let mut optional = Self {
            presence: PresenceFlag::PresentWithValues,
            node: Some(node),
        };
        optional.refresh();
        optional
    }

    pub fn set(&mut self, node: T) {
        self.node = Some(node);
        self.refresh();
    }

    /// Rebuilds a slot from a DTO: the re-derived flag plus whatever node
    /// the DTO carried. A node with data is never dropped, even if the
    /// flag says `Absent`; an empty node is dropped only for `Absent`.
    pub fn rebuild(presence: PresenceFlag, node: Option<T>) -> Self
    where
        T: Default,
    {
        let node = match (presence, node) {
            (PresenceFlag::Absent, Some(node)) => {
                let has_values = PresenceFlag::classify(Some(&node.to_tree()))
                    == PresenceFlag::PresentWithValues;
                has_values.then_some(node)
            }
            (PresenceFlag::Absent, None) => None,
            (_, Some(node)) => Some(node),
            (_, None) => Some(T::default()),
        };
        let mut optional = Self { presence, node };
        optional.refresh();
        optional
    }

    /// Flag the slot would have if written now.
    pub fn effective_presence(&self) -> PresenceFlag {
        match &self.node {
            None => self.presence.reevaluate(false, false),
            Some(node) => {
                let tree = node.to_tree();
                let has_values =
                    PresenceFlag::classify(Some(&tree)) == PresenceFlag::PresentWithValues;
                self.presence.reevaluate(true, has_values)
            }
        }
    }

    /// Re-evaluates the stored flag after edits.
    pub fn refresh(&mut self) -> PresenceFlag {
        self.presence = self.effective_presence();
        self.presence
    }

    /// The element to write, if any.
    pub fn emit(&self) -> Option<XmlElement> {
        let node = self.node.as_ref()?;
        let tree = node.to_tree();
        let has_values = PresenceFlag::classify(Some(&tree)) == PresenceFlag::PresentWithValues;
        self.presence
            .reevaluate(true, has_values)
            .should_emit()
            .then_some(tree)
    }
}

/// An undeclared child element and the declared sibling it followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredElement {
    /// Tag of the closest preceding declared sibling; `None` when it came first.
    pub anchor: Option<String>,
    /// Which same-tag declared sibling the anchor is, counting from zero.
    pub occurrence: usize,
    pub element: XmlElement,
}

/// Content a node does not declare, kept verbatim for the rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unknown {
    pub attributes: Vec<Attribute>,
    pub children: Vec<AnchoredElement>,
    pub text: Option<String>,
}

impl Unknown {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.is_none()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|child| child.element.name.as_str())
    }
}
