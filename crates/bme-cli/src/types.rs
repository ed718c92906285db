use std::path::PathBuf;

use bme_model::{Difference, ParseError};
use bme_schema::SchemaKind;

/// Outcome of checking one file.
#[derive(Debug)]
pub struct CheckReport {
    pub path: PathBuf,
    pub kind: Option<SchemaKind>,
    pub differences: Vec<Difference>,
    pub parse_errors: Vec<ParseError>,
    pub source_digest: Option<String>,
    pub written_digest: Option<String>,
    /// Set when the file could not be read, parsed or written.
    pub error: Option<String>,
}

impl CheckReport {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            kind: None,
            differences: Vec::new(),
            parse_errors: Vec::new(),
            source_digest: None,
            written_digest: None,
            error: None,
        }
    }

    #[must_use]
    pub fn failed_with(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_drift(&self) -> bool {
        !self.differences.is_empty()
    }

    /// Whether the rewrite reproduced the source bytes exactly.
    pub fn byte_identical(&self) -> Option<bool> {
        match (&self.source_digest, &self.written_digest) {
            (Some(source), Some(written)) => Some(source == written),
            _ => None,
        }
    }
}

/// One supported file kind, as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaListing {
    pub kind: SchemaKind,
    pub root_tag: &'static str,
    pub entity_tag: Option<&'static str>,
    pub indexes: Vec<String>,
    pub streamable: bool,
}

impl From<SchemaKind> for SchemaListing {
    fn from(kind: SchemaKind) -> Self {
        Self {
            kind,
            root_tag: kind.root_tag(),
            entity_tag: kind.entity_tag(),
            indexes: kind.index_names(),
            streamable: kind.is_streamable(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CheckResult {
    pub reports: Vec<CheckReport>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.reports
            .iter()
            .any(|report| report.failed() || report.has_drift())
    }

    pub fn drifted(&self) -> usize {
        self.reports.iter().filter(|report| report.has_drift()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|report| report.failed()).count()
    }
}
