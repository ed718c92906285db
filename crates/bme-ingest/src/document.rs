//! A large entity document held as an indexed collection.

use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::Path;

use bme_model::{Diagnostics, ParseContext, XmlDeclaration, XmlDocument, XmlElement};

use crate::collection::{ChunkReport, IndexedCollection, IndexedEntity};
use crate::error::{IngestError, Result};
use crate::streaming::{ChunkedElementReader, PositionedElement, StreamOutcome, StreamingOptions};

#[derive(Debug)]
pub struct LargeDocument<T> {
    pub declaration: Option<XmlDeclaration>,
    /// Root name and attributes; its children live in `collection` and `others`.
    pub root: XmlElement,
    pub collection: IndexedCollection<T>,
    pub others: Vec<PositionedElement>,
    pub diagnostics: Diagnostics,
    /// False when `on_chunk` stopped ingestion, even after the last chunk.
    pub complete: bool,
}

impl<T: IndexedEntity> LargeDocument<T> {
    /// Streams `path` into a new document.
    pub fn load(path: &Path, options: StreamingOptions) -> Result<Self> {
        Self::load_with_progress(path, options, |_| ControlFlow::Continue(()))
    }

    /// Streams `path`, reporting after every chunk. `on_chunk` may stop
    /// ingestion between chunks; the document then holds what was read.
    pub fn load_with_progress<F>(path: &Path, options: StreamingOptions, on_chunk: F) -> Result<Self>
    where
        F: FnMut(&ChunkReport) -> ControlFlow<()>,
    {
        let reader = ChunkedElementReader::open(path, T::TAG, options)?.with_root(T::ROOT_TAG);
        let document = Self::ingest(reader, on_chunk)?;
        tracing::info!(
            path = %path.display(),
            elements = document.collection.len(),
            chunks = document.collection.progress().chunks,
            "loaded large document"
        );
        Ok(document)
    }

    pub fn from_reader<R: BufRead>(source: R, options: StreamingOptions) -> Result<Self> {
        let reader =
            ChunkedElementReader::from_reader(source, T::TAG, options).with_root(T::ROOT_TAG);
        Self::ingest(reader, |_| ControlFlow::Continue(()))
    }

    /// Builds a document from an already parsed root, ingesting its target
    /// children in chunks of `chunk_size`.
    pub fn from_element(root: &XmlElement, chunk_size: usize) -> Result<Self> {
        check_root::<T>(&root.name)?;
        let chunk_size = chunk_size.max(1);
        let mut collection = IndexedCollection::for_entity();
        let mut diagnostics = Diagnostics::default();
        let mut others = Vec::new();
        let mut pending = Vec::new();
        let mut chunk_index = 0;

        for (position, child) in root.elements().enumerate() {
            if child.name != T::TAG {
                others.push(PositionedElement {
                    position,
                    element: child.clone(),
                });
                continue;
            }
            pending.push(child);
            if pending.len() == chunk_size {
                let batch = std::mem::take(&mut pending);
                ingest_elements(&mut collection, &mut diagnostics, batch, chunk_index)?;
                chunk_index += 1;
            }
        }
        if !pending.is_empty() {
            ingest_elements(&mut collection, &mut diagnostics, pending, chunk_index)?;
        }

        let mut shell = XmlElement::new(root.name.clone());
        shell.attributes = root.attributes.clone();
        Ok(Self {
            declaration: None,
            root: shell,
            collection,
            others,
            diagnostics,
            complete: true,
        })
    }

    fn ingest<R, F>(reader: ChunkedElementReader<R>, mut on_chunk: F) -> Result<Self>
    where
        R: BufRead,
        F: FnMut(&ChunkReport) -> ControlFlow<()>,
    {
        let mut collection = IndexedCollection::for_entity();
        let mut diagnostics = Diagnostics::default();

        let outcome: StreamOutcome = reader.run(|chunk_index, elements| {
            let report =
                ingest_elements(&mut collection, &mut diagnostics, &elements, chunk_index)?;
            Ok(on_chunk(&report))
        })?;
        if !diagnostics.is_clean() {
            tracing::warn!(errors = diagnostics.len(), "large document has field errors");
        }

        Ok(Self {
            declaration: outcome.declaration,
            root: outcome.root,
            collection,
            others: outcome.others,
            diagnostics,
            complete: outcome.completed,
        })
    }

    /// The root with collection elements and other children interleaved in
    /// their original order.
    pub fn to_tree(&self) -> XmlElement {
        let mut root = self.root.clone();
        let mut elements = self.collection.elements().iter();
        let mut others = self.others.iter().peekable();
        let total = self.collection.len() + self.others.len();
        for position in 0..total {
            if let Some(other) = others.next_if(|other| other.position <= position) {
                root.push_child(other.element.clone());
            } else if let Some(element) = elements.next() {
                root.push_child(element.to_tree());
            } else if let Some(other) = others.next() {
                root.push_child(other.element.clone());
            }
        }
        root
    }

    pub fn to_document(&self) -> XmlDocument {
        XmlDocument {
            declaration: self.declaration.clone(),
            root: self.to_tree(),
        }
    }
}

fn check_root<T: IndexedEntity>(found: &str) -> Result<()> {
    if found == T::ROOT_TAG {
        Ok(())
    } else {
        Err(IngestError::RootMismatch {
            expected: T::ROOT_TAG.to_string(),
            found: found.to_string(),
        })
    }
}

fn ingest_elements<'e, T: IndexedEntity>(
    collection: &mut IndexedCollection<T>,
    diagnostics: &mut Diagnostics,
    elements: impl IntoIterator<Item = &'e XmlElement>,
    chunk_index: u64,
) -> Result<ChunkReport> {
    let mut ctx = ParseContext::under(T::ROOT_TAG);
    let nodes: Vec<T> = elements
        .into_iter()
        .map(|element| ctx.parse::<T>(element))
        .collect();
    let report = collection.ingest_chunk(nodes, chunk_index)?;
    diagnostics.merge(ctx.finish());
    Ok(report)
}
