//! Streaming reads of large entity files.
//!
//! Only the children of the document root are materialized, one at a
//! time, and elements with the target tag are handed out in chunks. The
//! root's other children are kept with their position so the document can
//! be written back in its original order.
//!
//! # Usage
//!
//! ```ignore
//! use std::ops::ControlFlow;
//! use bme_ingest::streaming::{ChunkedElementReader, FileSizeCategory};
//!
//! let options = FileSizeCategory::from_path(&path)?.recommended_options();
//! let reader = ChunkedElementReader::open(&path, "MPClassDivision", options)?;
//! let outcome = reader.run(|chunk_index, elements| {
//!     println!("chunk {chunk_index}: {} elements", elements.len());
//!     Ok(ControlFlow::Continue(()))
//! })?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::ControlFlow;
use std::path::Path;

use bme_model::{XmlDeclaration, XmlElement};
use bme_xml::reader::{element_from_start, read_declaration};
use bme_xml::{ReadOptions, TreeBuilder, XmlError};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Default file size threshold (in bytes) above which streaming is used.
/// Default: 10 MB
pub const DEFAULT_STREAMING_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

/// Files at or above this size use the smaller chunk size.
pub const VERY_LARGE_THRESHOLD_BYTES: u64 = 100 * 1024 * 1024;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

pub const VERY_LARGE_CHUNK_SIZE: usize = 500;

/// Options for streaming ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingOptions {
    /// Elements per chunk. Defaults to 1000.
    pub chunk_size: usize,

    /// Size above which callers should stream instead of parsing the whole
    /// document. Defaults to 10 MB.
    pub threshold_bytes: u64,

    /// Keep comments inside streamed elements. Defaults to true.
    pub keep_comments: bool,
}

impl Default for StreamingOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            threshold_bytes: DEFAULT_STREAMING_THRESHOLD_BYTES,
            keep_comments: true,
        }
    }
}

impl StreamingOptions {
    /// Set the chunk size. Zero is treated as one.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_threshold_bytes(mut self, bytes: u64) -> Self {
        self.threshold_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    fn read_options(&self) -> ReadOptions {
        ReadOptions::default().with_comments(self.keep_comments)
    }
}

/// File size category for choosing streaming options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileSizeCategory {
    /// Small: < 10 MB
    Small,
    /// Large: 10 MB - 100 MB
    Large,
    /// VeryLarge: >= 100 MB
    VeryLarge,
}

impl FileSizeCategory {
    pub fn from_len(bytes: u64) -> Self {
        if bytes < DEFAULT_STREAMING_THRESHOLD_BYTES {
            FileSizeCategory::Small
        } else if bytes < VERY_LARGE_THRESHOLD_BYTES {
            FileSizeCategory::Large
        } else {
            FileSizeCategory::VeryLarge
        }
    }

    /// Determine file size category from path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|err| IngestError::io(path, err))?;
        Ok(Self::from_len(metadata.len()))
    }

    /// Get recommended streaming options for this file size.
    pub fn recommended_options(&self) -> StreamingOptions {
        match self {
            FileSizeCategory::Small | FileSizeCategory::Large => StreamingOptions::default(),
            FileSizeCategory::VeryLarge => {
                StreamingOptions::default().with_chunk_size(VERY_LARGE_CHUNK_SIZE)
            }
        }
    }
}

/// Whether `path` is large enough to stream, using the default threshold.
pub fn should_use_streaming(path: impl AsRef<Path>) -> bool {
    should_use_streaming_with_threshold(path, DEFAULT_STREAMING_THRESHOLD_BYTES)
}

/// Unreadable paths report false; the caller's regular read surfaces the error.
pub fn should_use_streaming_with_threshold(path: impl AsRef<Path>, threshold_bytes: u64) -> bool {
    std::fs::metadata(path.as_ref())
        .map(|metadata| metadata.len() >= threshold_bytes)
        .unwrap_or(false)
}

/// A root child that is not a target element, with its index among all
/// root children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedElement {
    pub position: usize,
    pub element: XmlElement,
}

/// Everything a streaming pass saw besides the delivered chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub declaration: Option<XmlDeclaration>,
    /// Root name and attributes; no children.
    pub root: XmlElement,
    pub others: Vec<PositionedElement>,
    pub chunks: u64,
    pub elements: usize,
    /// False whenever the callback returned `Break`, including for the
    /// last chunk of the file.
    pub completed: bool,
}

pub struct ChunkedElementReader<R> {
    reader: Reader<R>,
    target: String,
    expected_root: Option<String>,
    options: StreamingOptions,
}

impl ChunkedElementReader<BufReader<File>> {
    pub fn open(path: &Path, target: impl Into<String>, options: StreamingOptions) -> Result<Self> {
        let file = File::open(path).map_err(|err| IngestError::io(path, err))?;
        tracing::debug!(
            path = %path.display(),
            chunk_size = options.chunk_size,
            "opening streaming reader"
        );
        Ok(Self::from_reader(BufReader::new(file), target, options))
    }
}

impl<R: BufRead> ChunkedElementReader<R> {
    pub fn from_reader(source: R, target: impl Into<String>, options: StreamingOptions) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            target: target.into(),
            expected_root: None,
            options,
        }
    }

    /// Fails the pass with [`IngestError::RootMismatch`] as soon as the root
    /// start tag has another name.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.expected_root = Some(root.into());
        self
    }

    fn check_root(&self, root: &XmlElement) -> Result<()> {
        match &self.expected_root {
            Some(expected) if *expected != root.name => Err(IngestError::RootMismatch {
                expected: expected.clone(),
                found: root.name.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Streams the document, calling `on_chunk(chunk_index, elements)` for
    /// every full chunk and once more for the remainder.
    ///
    /// Returning `ControlFlow::Break` stops the pass after that chunk.
    pub fn run<F>(mut self, mut on_chunk: F) -> Result<StreamOutcome>
    where
        F: FnMut(u64, Vec<XmlElement>) -> Result<ControlFlow<()>>,
    {
        let chunk_size = self.options.chunk_size.max(1);
        let mut builder = TreeBuilder::new(self.options.read_options());
        let mut buf = Vec::new();
        let mut declaration = None;
        let mut root: Option<XmlElement> = None;
        let mut root_closed = false;
        let mut others = Vec::new();
        let mut pending = Vec::with_capacity(chunk_size);
        let mut position = 0usize;
        let mut chunks = 0u64;
        let mut elements = 0usize;

        loop {
            let offset = self.reader.buffer_position();
            let event = self
                .reader
                .read_event_into(&mut buf)
                .map_err(|err| XmlError::Syntax {
                    position: self.reader.error_position(),
                    source: err,
                })?;
            match &event {
                Event::Eof => break,
                Event::Decl(decl) => declaration = Some(read_declaration(decl, offset)?),
                Event::Start(start) if root.is_none() => {
                    let element = element_from_start(start, self.reader.decoder(), offset)?;
                    self.check_root(&element)?;
                    root = Some(element);
                }
                Event::Empty(start) if root.is_none() => {
                    let element = element_from_start(start, self.reader.decoder(), offset)?;
                    self.check_root(&element)?;
                    root = Some(element);
                    root_closed = true;
                }
                Event::End(_) if root.is_some() && builder.is_idle() => root_closed = true,
                _ if root.is_none() || root_closed => {}
                _ => {
                    if let Some(child) = builder.feed(&event, self.reader.decoder(), offset)? {
                        if child.name == self.target {
                            pending.push(child);
                            if pending.len() == chunk_size {
                                elements += pending.len();
                                let batch = std::mem::replace(
                                    &mut pending,
                                    Vec::with_capacity(chunk_size),
                                );
                                let flow = on_chunk(chunks, batch)?;
                                chunks += 1;
                                if flow.is_break() {
                                    tracing::info!(chunks, elements, "streaming stopped by caller");
                                    let root = root.take().ok_or(XmlError::NoRootElement)?;
                                    return Ok(StreamOutcome {
                                        declaration,
                                        root,
                                        others,
                                        chunks,
                                        elements,
                                        completed: false,
                                    });
                                }
                            }
                        } else {
                            others.push(PositionedElement {
                                position,
                                element: child,
                            });
                        }
                        position += 1;
                    }
                }
            }
            buf.clear();
        }

        let root = root.ok_or(XmlError::NoRootElement)?;
        let mut completed = true;
        if !pending.is_empty() {
            elements += pending.len();
            let flow = on_chunk(chunks, pending)?;
            chunks += 1;
            completed = flow.is_continue();
        }
        tracing::debug!(chunks, elements, others = others.len(), "streaming pass finished");
        Ok(StreamOutcome {
            declaration,
            root,
            others,
            chunks,
            elements,
            completed,
        })
    }
}
