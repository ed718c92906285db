//! Secondary indexes over an [`crate::IndexedCollection`].

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Bucket holding elements whose key function failed.
pub const UNINDEXED_BUCKET: &str = "__unindexed__";

/// Position of an element in the collection's primary list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementRef(usize);

impl ElementRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A key function could not derive a key for an element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct UnindexableElement {
    pub reason: String,
}

impl UnindexableElement {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type KeyResult = std::result::Result<Vec<String>, UnindexableElement>;

type KeyFn<T> = Box<dyn Fn(&T) -> KeyResult + Send + Sync>;

/// A named key → element-references map, maintained incrementally.
///
/// A key function may return several keys; an empty list means the
/// element is not part of this index. Errors route the element to
/// [`UNINDEXED_BUCKET`].
pub struct SecondaryIndex<T> {
    name: String,
    key_fn: KeyFn<T>,
    buckets: HashMap<String, Vec<ElementRef>>,
    unindexed: usize,
}

impl<T> SecondaryIndex<T> {
    pub fn new<F>(name: impl Into<String>, key_fn: F) -> Self
    where
        F: Fn(&T) -> KeyResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            key_fn: Box::new(key_fn),
            buckets: HashMap::new(),
            unindexed: 0,
        }
    }

    /// Index with at most one key per element; `None` skips the element.
    pub fn single<F>(name: impl Into<String>, key_fn: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(name, move |element| Ok(key_fn(element).into_iter().collect()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookup(&self, key: &str) -> &[ElementRef] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// `(key, bucket size)` pairs sorted by key.
    pub fn bucket_sizes(&self) -> Vec<(&str, usize)> {
        let mut sizes: Vec<(&str, usize)> = self
            .buckets
            .iter()
            .map(|(key, refs)| (key.as_str(), refs.len()))
            .collect();
        sizes.sort_unstable();
        sizes
    }

    pub fn unindexed_count(&self) -> usize {
        self.unindexed
    }

    /// Files `element` under its keys. Returns false when it went to the
    /// unindexed bucket.
    pub(crate) fn insert(&mut self, element_ref: ElementRef, element: &T) -> bool {
        match (self.key_fn)(element) {
            Ok(keys) => {
                let mut seen: Vec<&str> = Vec::with_capacity(keys.len());
                for key in &keys {
                    if seen.contains(&key.as_str()) {
                        continue;
                    }
                    seen.push(key);
                    self.buckets.entry(key.clone()).or_default().push(element_ref);
                }
                true
            }
            Err(err) => {
                tracing::debug!(
                    index = %self.name,
                    element = element_ref.index(),
                    reason = %err,
                    "element is not indexable"
                );
                self.buckets
                    .entry(UNINDEXED_BUCKET.to_string())
                    .or_default()
                    .push(element_ref);
                self.unindexed += 1;
                false
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
        self.unindexed = 0;
    }
}

impl<T> fmt::Debug for SecondaryIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondaryIndex")
            .field("name", &self.name)
            .field("keys", &self.buckets.len())
            .field("unindexed", &self.unindexed)
            .finish_non_exhaustive()
    }
}
