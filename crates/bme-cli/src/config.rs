//! Optional TOML configuration.
//!
//! ```toml
//! policy = "fail-fast"
//!
//! [streaming]
//! chunk_size = 500
//! threshold_bytes = 10485760
//! keep_comments = false
//!
//! [writer]
//! indent = "spaces"
//! indent_width = 4
//! ```
//!
//! Command-line flags override these values; missing values fall back to
//! the library defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bme_ingest::{DEFAULT_CHUNK_SIZE, DEFAULT_STREAMING_THRESHOLD_BYTES, StreamingOptions};
use bme_model::ErrorPolicy;
use bme_xml::{Indent, WriteOptions};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub policy: Option<ErrorPolicy>,
    pub streaming: StreamingConfig,
    pub writer: WriterConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingConfig {
    pub chunk_size: Option<usize>,
    pub threshold_bytes: Option<u64>,
    pub keep_comments: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    pub indent: Option<IndentStyle>,
    pub indent_width: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentStyle {
    /// Reuse the indentation detected in each source file.
    Match,
    Compact,
    Spaces,
    Tabs,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Settings after merging defaults, the config file and command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub policy: ErrorPolicy,
    pub streaming: StreamingOptions,
    pub indent: IndentStyle,
    pub indent_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::default(),
            streaming: StreamingOptions::default(),
            indent: IndentStyle::Match,
            indent_width: 2,
        }
    }
}

impl Settings {
    pub fn from_config(config: &FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            policy: config.policy.unwrap_or(defaults.policy),
            streaming: StreamingOptions::default()
                .with_chunk_size(config.streaming.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE))
                .with_threshold_bytes(
                    config
                        .streaming
                        .threshold_bytes
                        .unwrap_or(DEFAULT_STREAMING_THRESHOLD_BYTES),
                )
                .with_comments(
                    config
                        .streaming
                        .keep_comments
                        .unwrap_or(defaults.streaming.keep_comments),
                ),
            indent: config.writer.indent.unwrap_or(defaults.indent),
            indent_width: config.writer.indent_width.unwrap_or(defaults.indent_width),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Option<ErrorPolicy>) -> Self {
        if let Some(policy) = policy {
            self.policy = policy;
        }
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        if let Some(chunk_size) = chunk_size {
            self.streaming = self.streaming.with_chunk_size(chunk_size);
        }
        self
    }

    /// Writer options for a file whose original text is `source`.
    pub fn write_options(&self, source: &str) -> WriteOptions {
        let matching = WriteOptions::matching(source);
        match self.indent {
            IndentStyle::Match => matching,
            IndentStyle::Compact => matching.with_indent(None),
            IndentStyle::Spaces => matching.with_indent(Some(Indent::spaces(self.indent_width))),
            IndentStyle::Tabs => matching.with_indent(Some(Indent::tabs())),
        }
    }
}
