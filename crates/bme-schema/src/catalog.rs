//! Printable summaries of an indexed collection.

use bme_ingest::{IndexedCollection, IndexedEntity};
use bme_model::{Diagnostics, RoundTripNode};
use serde::Serialize;

/// An index and key to resolve against a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub index: String,
    pub key: String,
}

impl Lookup {
    pub fn new(index: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexBuckets {
    pub name: String,
    /// `(key, element count)`, sorted by key.
    pub buckets: Vec<(String, usize)>,
    pub unindexed: usize,
}

/// One element found by a lookup, labelled by its `id` or `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupHit {
    pub position: usize,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub entity: String,
    pub elements: usize,
    pub chunks: u64,
    pub complete: bool,
    pub indexes: Vec<IndexBuckets>,
    pub hits: Option<Vec<LookupHit>>,
    pub diagnostics: Diagnostics,
}

impl IndexSummary {
    pub fn from_collection<T: IndexedEntity>(
        collection: &IndexedCollection<T>,
        lookup: Option<&Lookup>,
    ) -> Self {
        let indexes = collection
            .indexes()
            .iter()
            .map(|index| IndexBuckets {
                name: index.name().to_string(),
                buckets: index
                    .bucket_sizes()
                    .into_iter()
                    .map(|(key, count)| (key.to_string(), count))
                    .collect(),
                unindexed: index.unindexed_count(),
            })
            .collect();
        let hits = lookup.map(|lookup| {
            collection
                .lookup(&lookup.index, &lookup.key)
                .iter()
                .filter_map(|element_ref| {
                    let element = collection.get(*element_ref)?;
                    Some(LookupHit {
                        position: element_ref.index(),
                        label: label_of(element),
                    })
                })
                .collect()
        });
        Self {
            entity: T::TAG.to_string(),
            elements: collection.len(),
            chunks: collection.progress().chunks,
            complete: true,
            indexes,
            hits,
            diagnostics: Diagnostics::default(),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics, complete: bool) -> Self {
        self.diagnostics = diagnostics;
        self.complete = complete;
        self
    }

    pub fn total_unindexed(&self) -> usize {
        self.indexes.iter().map(|index| index.unindexed).sum()
    }
}

fn label_of<T: RoundTripNode>(element: &T) -> Option<String> {
    let tree = element.to_tree();
    tree.attribute("id")
        .or_else(|| tree.attribute("name"))
        .map(str::to_string)
}
