//! Tri-state presence bookkeeping for optional children.
//!
//! One shared classification replaces per-field `Has*` booleans: a child
//! element is either missing from the source, present with nothing in it,
//! or present with data. Writers consult the flag to decide whether the
//! element is emitted at all.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tree::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceFlag {
    /// Not in the source; never emitted.
    #[default]
    Absent,
    /// Present with no child elements, no text and no meaningful attributes.
    /// Emitted as an empty element.
    PresentEmpty,
    /// Present with at least one attribute, child element or text.
    PresentWithValues,
}

impl PresenceFlag {
    /// Classifies a possibly missing source element.
    ///
    /// Whitespace-only text, comments and namespace declarations do not
    /// count as content, so `<x>  <!-- c --> </x>` is `PresentEmpty`.
    pub fn classify(raw: Option<&XmlElement>) -> Self {
        match raw {
            None => PresenceFlag::Absent,
            Some(element) => {
                let has_values = element.has_element_children()
                    || element.has_text_content()
                    || element.meaningful_attributes().next().is_some();
                if has_values {
                    PresenceFlag::PresentWithValues
                } else {
                    PresenceFlag::PresentEmpty
                }
            }
        }
    }

    /// False only for `Absent`.
    pub fn should_emit(self) -> bool {
        !matches!(self, PresenceFlag::Absent)
    }

    pub fn is_present(self) -> bool {
        self.should_emit()
    }

    /// Recomputes the flag after edits.
    ///
    /// `has_node` tells whether the owning slot still holds a value,
    /// `has_values` whether that value carries data. Removing every child
    /// from a present element leaves it `PresentEmpty`; it only becomes
    /// `Absent` when the slot itself is cleared.
    pub fn reevaluate(self, has_node: bool, has_values: bool) -> Self {
        match (has_node, has_values) {
            (false, _) => PresenceFlag::Absent,
            (true, true) => PresenceFlag::PresentWithValues,
            (true, false) => PresenceFlag::PresentEmpty,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresenceFlag::Absent => "absent",
            PresenceFlag::PresentEmpty => "present_empty",
            PresenceFlag::PresentWithValues => "present_with_values",
        }
    }
}

impl fmt::Display for PresenceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`PresenceFlag::classify`].
pub fn classify(raw: Option<&XmlElement>) -> PresenceFlag {
    PresenceFlag::classify(raw)
}

/// Free-function form of [`PresenceFlag::should_emit`].
pub fn should_emit(flag: PresenceFlag) -> bool {
    flag.should_emit()
}
