//! Ordered heterogeneous child lists.
//!
//! Some elements interleave children of several tags whose relative order
//! is meaningful (a credits category mixes sections, entries, blank lines
//! and images). `OrderedList` stores them as one sequence so the rewrite
//! never regroups them by tag.

use crate::context::ParseContext;
use crate::tree::XmlElement;

/// The closed set of child kinds an ordered list understands.
pub trait ListVariant: Sized {
    /// Parses `element` if its tag belongs to the set, `None` otherwise.
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self>;

    fn tag(&self) -> &'static str;

    fn to_tree(&self) -> XmlElement;
}

/// One entry: a recognized variant or an undeclared element kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem<V> {
    Known(V),
    Opaque(XmlElement),
}

impl<V: ListVariant> ListItem<V> {
    pub fn tag(&self) -> &str {
        match self {
            ListItem::Known(variant) => variant.tag(),
            ListItem::Opaque(element) => &element.name,
        }
    }

    pub fn to_tree(&self) -> XmlElement {
        match self {
            ListItem::Known(variant) => variant.to_tree(),
            ListItem::Opaque(element) => element.clone(),
        }
    }

    pub fn as_known(&self) -> Option<&V> {
        match self {
            ListItem::Known(variant) => Some(variant),
            ListItem::Opaque(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedList<V> {
    items: Vec<ListItem<V>>,
}

impl<V> Default for OrderedList<V> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<V> OrderedList<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, variant: V) {
        self.items.push(ListItem::Known(variant));
    }

    pub fn append_opaque(&mut self, element: XmlElement) {
        self.items.push(ListItem::Opaque(element));
    }

    /// Inserts at `index`, shifting later items. Panics if `index > len`.
    pub fn insert(&mut self, index: usize, variant: V) {
        self.items.insert(index, ListItem::Known(variant));
    }

    pub fn remove(&mut self, index: usize) -> Option<ListItem<V>> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn retain(&mut self, keep: impl FnMut(&ListItem<V>) -> bool) {
        self.items.retain(keep);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListItem<V>> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ListItem<V>> {
        self.items.iter_mut()
    }

    /// Recognized variants only, still in document order.
    pub fn known(&self) -> impl Iterator<Item = &V> {
        self.items.iter().filter_map(|item| match item {
            ListItem::Known(variant) => Some(variant),
            ListItem::Opaque(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V: ListVariant> OrderedList<V> {
    /// Walks `children` in document order, dispatching on tag. Unrecognized
    /// tags become opaque entries at their original position.
    pub fn from_tree<'e>(
        children: impl IntoIterator<Item = &'e XmlElement>,
        ctx: &mut ParseContext,
    ) -> Self {
        let mut list = Self::new();
        for child in children {
            match V::parse_tagged(child, ctx) {
                Some(variant) => list.append(variant),
                None => {
                    tracing::trace!(tag = %child.name, "keeping unrecognized list entry");
                    list.append_opaque(child.clone());
                }
            }
        }
        list
    }

    /// `(tag, element)` pairs in exactly append order.
    pub fn to_ordered_tree(&self) -> Vec<(String, XmlElement)> {
        self.items
            .iter()
            .map(|item| (item.tag().to_string(), item.to_tree()))
            .collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.items.iter().map(ListItem::tag).collect()
    }

    /// Legacy category-then-concatenate layout: all items of `order[0]`,
    /// then all of `order[1]`, and so on, then every remaining tag in its
    /// original order. Stable inside each group.
    ///
    /// Only for reproducing files written by the old regrouping writer;
    /// `to_ordered_tree` is what serialization uses.
    pub fn regrouped_by_tag(&self, order: &[&str]) -> Vec<(String, XmlElement)> {
        let rank = |tag: &str| {
            order
                .iter()
                .position(|candidate| *candidate == tag)
                .unwrap_or(order.len())
        };
        let mut indexed: Vec<(usize, &ListItem<V>)> =
            self.items.iter().map(|item| (rank(item.tag()), item)).collect();
        indexed.sort_by_key(|(rank, _)| *rank);
        indexed
            .into_iter()
            .map(|(_, item)| (item.tag().to_string(), item.to_tree()))
            .collect()
    }
}

impl<V> FromIterator<V> for OrderedList<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(ListItem::Known).collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a OrderedList<V> {
    type Item = &'a ListItem<V>;
    type IntoIter = std::slice::Iter<'a, ListItem<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
