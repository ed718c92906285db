//! Chunk-by-chunk ingestion into a primary list with secondary indexes.

use std::collections::BTreeMap;

use bme_model::RoundTripNode;
use serde::Serialize;

use crate::error::{IngestError, Result};
use crate::index::{ElementRef, SecondaryIndex};

/// An entity stored in large collections, with the indexes it declares.
pub trait IndexedEntity: RoundTripNode {
    /// Tag of the document root that holds the collection.
    const ROOT_TAG: &'static str;

    fn indexes() -> Vec<SecondaryIndex<Self>>;
}

/// Outcome of one `ingest_chunk` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub chunk_index: u64,
    pub ingested: usize,
    /// Index insertions routed to the unindexed bucket in this chunk.
    pub unindexed: usize,
    pub total_elements: usize,
}

/// Running totals across all chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestProgress {
    pub chunks: u64,
    pub elements: usize,
    pub unindexed: usize,
}

/// Per-index count of elements whose key function failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexDiagnostics {
    pub unindexed: BTreeMap<String, usize>,
}

impl IndexDiagnostics {
    pub fn total(&self) -> usize {
        self.unindexed.values().sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug)]
pub struct IndexedCollection<T> {
    elements: Vec<T>,
    indexes: Vec<SecondaryIndex<T>>,
    last_chunk: Option<u64>,
    progress: IngestProgress,
    torn_down: bool,
}

impl<T> Default for IndexedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexedCollection<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            indexes: Vec::new(),
            last_chunk: None,
            progress: IngestProgress::default(),
            torn_down: false,
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: SecondaryIndex<T>) -> Self {
        self.push_index(index);
        self
    }

    /// Registers an index, filling it from the elements already held.
    pub fn add_index(&mut self, index: SecondaryIndex<T>) -> Result<()> {
        self.ensure_live()?;
        self.push_index(index);
        Ok(())
    }

    fn push_index(&mut self, mut index: SecondaryIndex<T>) {
        for (position, element) in self.elements.iter().enumerate() {
            if !index.insert(ElementRef::new(position), element) {
                self.progress.unindexed += 1;
            }
        }
        self.indexes.push(index);
    }

    /// Appends one chunk and indexes it.
    ///
    /// `chunk_index` must exceed every index seen so far. A rejected call
    /// changes nothing.
    pub fn ingest_chunk(&mut self, elements: Vec<T>, chunk_index: u64) -> Result<ChunkReport> {
        self.ensure_live()?;
        match self.last_chunk {
            Some(last) if chunk_index == last => {
                return Err(IngestError::DuplicateChunk { chunk: chunk_index });
            }
            Some(last) if chunk_index < last => {
                return Err(IngestError::OutOfOrderChunk {
                    chunk: chunk_index,
                    last,
                });
            }
            _ => {}
        }

        let ingested = elements.len();
        let start = self.elements.len();
        self.elements.extend(elements);
        let unindexed = self.index_range(start);

        self.last_chunk = Some(chunk_index);
        self.progress.chunks += 1;
        self.progress.elements = self.elements.len();
        self.progress.unindexed += unindexed;

        let report = ChunkReport {
            chunk_index,
            ingested,
            unindexed,
            total_elements: self.elements.len(),
        };
        tracing::debug!(
            chunk = chunk_index,
            ingested,
            unindexed,
            total = report.total_elements,
            "ingested chunk"
        );
        Ok(report)
    }

    fn index_range(&mut self, start: usize) -> usize {
        let mut unindexed = 0;
        for index in &mut self.indexes {
            for (offset, element) in self.elements[start..].iter().enumerate() {
                if !index.insert(ElementRef::new(start + offset), element) {
                    unindexed += 1;
                }
            }
        }
        unindexed
    }

    /// Appends without touching the indexes; call `reindex_all` afterwards.
    pub fn extend_unindexed(&mut self, elements: impl IntoIterator<Item = T>) -> Result<()> {
        self.ensure_live()?;
        self.elements.extend(elements);
        self.progress.elements = self.elements.len();
        Ok(())
    }

    /// Moves every element of `other` to the end of this collection and
    /// rebuilds the indexes.
    pub fn merge(&mut self, other: IndexedCollection<T>) -> Result<()> {
        self.ensure_live()?;
        other.ensure_live()?;
        self.elements.extend(other.elements);
        self.reindex_all()
    }

    /// Rebuilds every index from the primary list.
    pub fn reindex_all(&mut self) -> Result<()> {
        self.ensure_live()?;
        for index in &mut self.indexes {
            index.clear();
        }
        let unindexed = self.index_range(0);
        self.progress.elements = self.elements.len();
        self.progress.unindexed = unindexed;
        tracing::debug!(
            elements = self.elements.len(),
            indexes = self.indexes.len(),
            unindexed,
            "rebuilt indexes"
        );
        Ok(())
    }

    /// Unknown index names and keys yield an empty slice.
    pub fn lookup(&self, index_name: &str, key: &str) -> &[ElementRef] {
        self.index(index_name)
            .map(|index| index.lookup(key))
            .unwrap_or_default()
    }

    pub fn lookup_elements(&self, index_name: &str, key: &str) -> Vec<&T> {
        self.lookup(index_name, key)
            .iter()
            .filter_map(|element_ref| self.get(*element_ref))
            .collect()
    }

    pub fn get(&self, element_ref: ElementRef) -> Option<&T> {
        self.elements.get(element_ref.index())
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    /// Direct mutation; the indexes go stale until `reindex_all`.
    pub fn elements_mut(&mut self) -> Result<&mut [T]> {
        self.ensure_live()?;
        Ok(&mut self.elements)
    }

    pub fn index(&self, name: &str) -> Option<&SecondaryIndex<T>> {
        self.indexes.iter().find(|index| index.name() == name)
    }

    pub fn indexes(&self) -> &[SecondaryIndex<T>] {
        &self.indexes
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.indexes.iter().map(SecondaryIndex::name).collect()
    }

    pub fn diagnostics(&self) -> IndexDiagnostics {
        IndexDiagnostics {
            unindexed: self
                .indexes
                .iter()
                .map(|index| (index.name().to_string(), index.unindexed_count()))
                .collect(),
        }
    }

    pub fn progress(&self) -> IngestProgress {
        self.progress
    }

    pub fn last_chunk(&self) -> Option<u64> {
        self.last_chunk
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Releases the indexes. Every later mutating call fails with `TornDown`.
    pub fn tear_down(&mut self) {
        for index in &mut self.indexes {
            index.clear();
        }
        self.torn_down = true;
        tracing::debug!(elements = self.elements.len(), "collection torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }

    fn ensure_live(&self) -> Result<()> {
        if self.torn_down {
            Err(IngestError::TornDown)
        } else {
            Ok(())
        }
    }
}

impl<T: IndexedEntity> IndexedCollection<T> {
    /// A collection with every index the entity declares.
    pub fn for_entity() -> Self {
        let mut collection = Self::new();
        for index in T::indexes() {
            collection.push_index(index);
        }
        collection
    }
}
