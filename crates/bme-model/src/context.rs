//! Parse-time bookkeeping: element path tracking and collected field errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, Result};
use crate::node::RoundTripNode;
use crate::tree::XmlElement;

/// A malformed scalar. Recorded, never thrown; siblings keep parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// Slash-separated element path, e.g. `MPClassDivisions/MPClassDivision/Perks`.
    pub path: String,
    pub field: String,
    pub raw_value: String,
    /// Human-readable name of the declared type.
    pub expected: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}: expected {}, found {:?}",
            self.path, self.field, self.expected, self.raw_value
        )
    }
}

/// What a caller does with collected parse errors once the tree is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    FailFast,
    #[default]
    WarnAndContinue,
}

/// Aggregated, read-only result of a parse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    parse_errors: Vec<ParseError>,
}

impl Diagnostics {
    pub fn errors(&self) -> &[ParseError] {
        &self.parse_errors
    }

    pub fn is_clean(&self) -> bool {
        self.parse_errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parse_errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parse_errors.is_empty()
    }

    /// Folds another pass (e.g. a later chunk) into this one.
    pub fn merge(&mut self, other: Diagnostics) {
        self.parse_errors.extend(other.parse_errors);
    }

    /// Applies the caller's policy. `WarnAndContinue` always succeeds.
    pub fn check(&self, policy: ErrorPolicy) -> Result<()> {
        match (policy, self.parse_errors.first()) {
            (ErrorPolicy::FailFast, Some(first)) => Err(ModelError::ParseFailed {
                count: self.parse_errors.len(),
                first: first.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Threaded through every `from_tree` call of one parse pass.
#[derive(Debug, Default)]
pub struct ParseContext {
    path: Vec<String>,
    errors: Vec<ParseError>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths start below `root`; for elements parsed apart from their document.
    pub fn under(root: impl Into<String>) -> Self {
        Self {
            path: vec![root.into()],
            errors: Vec::new(),
        }
    }

    /// Parses `element` as `T`, tracking it on the element path.
    pub fn parse<T: RoundTripNode>(&mut self, element: &XmlElement) -> T {
        self.path.push(element.name.clone());
        let node = T::from_tree(element, self);
        self.path.pop();
        node
    }

    pub fn current_path(&self) -> String {
        self.path.join("/")
    }

    pub fn record(&mut self, field: &str, raw_value: &str, expected: &str) {
        let error = ParseError {
            path: self.current_path(),
            field: field.to_string(),
            raw_value: raw_value.to_string(),
            expected: expected.to_string(),
        };
        tracing::debug!(%error, "recovered malformed scalar");
        self.errors.push(error);
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Second pass: hands every collected error to the caller.
    pub fn finish(self) -> Diagnostics {
        if !self.errors.is_empty() {
            tracing::warn!(count = self.errors.len(), "parse completed with field errors");
        }
        Diagnostics {
            parse_errors: self.errors,
        }
    }
}
