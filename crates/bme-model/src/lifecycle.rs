//! Lifecycle of a parsed document root.

use std::fmt;

use crate::context::{Diagnostics, ErrorPolicy, ParseContext};
use crate::error::{ModelError, Result};
use crate::node::RoundTripNode;
use crate::tree::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Unparsed,
    Parsed,
    Edited,
    /// A snapshot was written; editing again moves back to `Edited`.
    Serialized,
}

impl NodeState {
    pub fn on_parsed(self) -> Result<Self> {
        match self {
            NodeState::Unparsed => Ok(NodeState::Parsed),
            state => Err(ModelError::InvalidTransition {
                state,
                action: "parse",
            }),
        }
    }

    pub fn on_edit(self) -> Result<Self> {
        match self {
            NodeState::Unparsed => Err(ModelError::InvalidTransition {
                state: self,
                action: "edit",
            }),
            _ => Ok(NodeState::Edited),
        }
    }

    pub fn on_serialized(self) -> Result<Self> {
        match self {
            NodeState::Unparsed => Err(ModelError::InvalidTransition {
                state: self,
                action: "serialize",
            }),
            _ => Ok(NodeState::Serialized),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeState::Unparsed => "unparsed",
            NodeState::Parsed => "parsed",
            NodeState::Edited => "edited",
            NodeState::Serialized => "serialized",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A root node together with its lifecycle state and parse diagnostics.
#[derive(Debug)]
pub struct Document<T> {
    root: Option<T>,
    state: NodeState,
    diagnostics: Diagnostics,
}

impl<T> Default for Document<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Document<T> {
    /// An empty document in the `Unparsed` state.
    pub fn new() -> Self {
        Self {
            root: None,
            state: NodeState::Unparsed,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn root(&self) -> Option<&T> {
        self.root.as_ref()
    }

    /// Runs `edit` against the root and marks the document `Edited`.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut T) -> R) -> Result<R> {
        let next = self.state.on_edit()?;
        let root = self.root.as_mut().ok_or(ModelError::InvalidTransition {
            state: self.state,
            action: "edit",
        })?;
        let output = edit(root);
        self.state = next;
        Ok(output)
    }

    pub fn into_root(self) -> Option<T> {
        self.root
    }
}

impl<T: RoundTripNode> Document<T> {
    /// Parses `element` into a fresh document, checking the root tag.
    pub fn parse(element: &XmlElement, policy: ErrorPolicy) -> Result<Self> {
        let mut document = Self::new();
        document.load(element, policy)?;
        Ok(document)
    }

    /// Parses into this (still `Unparsed`) document.
    pub fn load(&mut self, element: &XmlElement, policy: ErrorPolicy) -> Result<()> {
        let next = self.state.on_parsed()?;
        if element.name != T::TAG {
            return Err(ModelError::RootMismatch {
                expected: T::TAG.to_string(),
                found: element.name.clone(),
            });
        }
        let mut ctx = ParseContext::new();
        let root = ctx.parse::<T>(element);
        let diagnostics = ctx.finish();
        diagnostics.check(policy)?;
        tracing::debug!(
            root = T::TAG,
            errors = diagnostics.len(),
            "parsed document root"
        );
        self.root = Some(root);
        self.diagnostics = diagnostics;
        self.state = next;
        Ok(())
    }

    /// Wraps a node built in memory, e.g. from a DTO.
    pub fn from_node(root: T) -> Self {
        Self {
            root: Some(root),
            state: NodeState::Edited,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Writes a snapshot of the root.
    pub fn serialize(&mut self) -> Result<XmlElement> {
        let next = self.state.on_serialized()?;
        let root = self.root.as_ref().ok_or(ModelError::InvalidTransition {
            state: self.state,
            action: "serialize",
        })?;
        let tree = root.to_tree();
        self.state = next;
        Ok(tree)
    }
}
