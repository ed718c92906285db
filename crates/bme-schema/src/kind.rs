//! Mapping document roots to their schema.

use std::fmt;
use std::ops::ControlFlow;
use std::path::Path;

use bme_ingest::{ChunkReport, IndexedCollection, IndexedEntity, LargeDocument, StreamingOptions};
use bme_model::{Diagnostics, Document, ErrorPolicy, RoundTripNode, XmlElement};
use bme_xml::ReadOptions;
use serde::Serialize;

use crate::catalog::{IndexSummary, Lookup};
use crate::class_divisions::MpClassDivision;
use crate::credits::Credits;
use crate::error::{Result, SchemaError};
use crate::flora::FloraLayerSet;
use crate::items::Items;
use crate::prerender::{PostfxGraph, Prerender};
use crate::terrain_materials::TerrainMaterial;
use crate::weapon_descriptions::WeaponDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Credits,
    ClassDivisions,
    TerrainMaterials,
    WeaponDescriptions,
    FloraLayerSets,
    Prerender,
    Items,
}

/// A parsed and re-serialized root.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub kind: SchemaKind,
    pub tree: XmlElement,
    pub diagnostics: Diagnostics,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 7] = [
        SchemaKind::Credits,
        SchemaKind::ClassDivisions,
        SchemaKind::TerrainMaterials,
        SchemaKind::WeaponDescriptions,
        SchemaKind::FloraLayerSets,
        SchemaKind::Prerender,
        SchemaKind::Items,
    ];

    pub fn detect(root_tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.root_tag() == root_tag)
            .ok_or_else(|| SchemaError::UnknownRoot {
                tag: root_tag.to_string(),
            })
    }

    pub fn root_tag(self) -> &'static str {
        match self {
            SchemaKind::Credits => Credits::TAG,
            SchemaKind::ClassDivisions => MpClassDivision::ROOT_TAG,
            SchemaKind::TerrainMaterials => TerrainMaterial::ROOT_TAG,
            SchemaKind::WeaponDescriptions => WeaponDescription::ROOT_TAG,
            SchemaKind::FloraLayerSets => FloraLayerSet::ROOT_TAG,
            SchemaKind::Prerender => Prerender::TAG,
            SchemaKind::Items => Items::TAG,
        }
    }

    /// Tag of the repeated element the file is a collection of, for files
    /// held as an indexed collection.
    pub fn entity_tag(self) -> Option<&'static str> {
        match self {
            SchemaKind::ClassDivisions => Some(MpClassDivision::TAG),
            SchemaKind::TerrainMaterials => Some(TerrainMaterial::TAG),
            SchemaKind::WeaponDescriptions => Some(WeaponDescription::TAG),
            SchemaKind::FloraLayerSets => Some(FloraLayerSet::TAG),
            SchemaKind::Prerender => Some(PostfxGraph::TAG),
            SchemaKind::Credits | SchemaKind::Items => None,
        }
    }

    /// Names of the secondary indexes built over the entities.
    pub fn index_names(self) -> Vec<String> {
        match self {
            SchemaKind::ClassDivisions => names_of::<MpClassDivision>(),
            SchemaKind::TerrainMaterials => names_of::<TerrainMaterial>(),
            SchemaKind::WeaponDescriptions => names_of::<WeaponDescription>(),
            SchemaKind::FloraLayerSets => names_of::<FloraLayerSet>(),
            SchemaKind::Prerender => names_of::<PostfxGraph>(),
            SchemaKind::Credits | SchemaKind::Items => Vec::new(),
        }
    }

    pub fn is_indexed(self) -> bool {
        self.entity_tag().is_some()
    }

    /// Whether the entities are direct children of the root, so the file
    /// can be read in chunks.
    pub fn is_streamable(self) -> bool {
        self.is_indexed() && self != SchemaKind::Prerender
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Credits => "credits",
            SchemaKind::ClassDivisions => "class_divisions",
            SchemaKind::TerrainMaterials => "terrain_materials",
            SchemaKind::WeaponDescriptions => "weapon_descriptions",
            SchemaKind::FloraLayerSets => "flora_layer_sets",
            SchemaKind::Prerender => "prerender",
            SchemaKind::Items => "items",
        }
    }

    /// Parses `root` into its domain objects and writes them back.
    ///
    /// Large entity files go through an indexed collection in chunks of
    /// `chunk_size`, the rest through a [`Document`].
    pub fn round_trip(
        self,
        root: &XmlElement,
        policy: ErrorPolicy,
        chunk_size: usize,
    ) -> Result<RoundTrip> {
        let (tree, diagnostics) = match self {
            SchemaKind::Credits => document_round_trip::<Credits>(root, policy)?,
            SchemaKind::Prerender => document_round_trip::<Prerender>(root, policy)?,
            SchemaKind::Items => document_round_trip::<Items>(root, policy)?,
            SchemaKind::ClassDivisions => {
                collection_round_trip::<MpClassDivision>(root, policy, chunk_size)?
            }
            SchemaKind::TerrainMaterials => {
                collection_round_trip::<TerrainMaterial>(root, policy, chunk_size)?
            }
            SchemaKind::WeaponDescriptions => {
                collection_round_trip::<WeaponDescription>(root, policy, chunk_size)?
            }
            SchemaKind::FloraLayerSets => {
                collection_round_trip::<FloraLayerSet>(root, policy, chunk_size)?
            }
        };
        tracing::debug!(
            schema = self.as_str(),
            errors = diagnostics.len(),
            "round trip finished"
        );
        Ok(RoundTrip {
            kind: self,
            tree,
            diagnostics,
        })
    }

    /// Loads `path` into the entity's indexed collection and summarizes the
    /// buckets. `on_chunk` sees every chunk and may stop the load early.
    pub fn index_file<F>(
        self,
        path: &Path,
        options: StreamingOptions,
        lookup: Option<&Lookup>,
        on_chunk: F,
    ) -> Result<IndexSummary>
    where
        F: FnMut(&ChunkReport) -> ControlFlow<()>,
    {
        match self {
            SchemaKind::ClassDivisions => {
                index_large::<MpClassDivision, F>(path, options, lookup, on_chunk)
            }
            SchemaKind::TerrainMaterials => {
                index_large::<TerrainMaterial, F>(path, options, lookup, on_chunk)
            }
            SchemaKind::WeaponDescriptions => {
                index_large::<WeaponDescription, F>(path, options, lookup, on_chunk)
            }
            SchemaKind::FloraLayerSets => {
                index_large::<FloraLayerSet, F>(path, options, lookup, on_chunk)
            }
            SchemaKind::Prerender => {
                index_prerender(path, options.keep_comments, lookup, on_chunk)
            }
            SchemaKind::Credits | SchemaKind::Items => Err(SchemaError::NotIndexed {
                tag: self.root_tag().to_string(),
            }),
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn names_of<T: IndexedEntity>() -> Vec<String> {
    T::indexes()
        .iter()
        .map(|index| index.name().to_string())
        .collect()
}

fn document_round_trip<T: RoundTripNode>(
    root: &XmlElement,
    policy: ErrorPolicy,
) -> Result<(XmlElement, Diagnostics)> {
    let mut document = Document::<T>::parse(root, policy)?;
    let diagnostics = document.diagnostics().clone();
    let tree = document.serialize()?;
    Ok((tree, diagnostics))
}

fn collection_round_trip<T: IndexedEntity>(
    root: &XmlElement,
    policy: ErrorPolicy,
    chunk_size: usize,
) -> Result<(XmlElement, Diagnostics)> {
    let document = LargeDocument::<T>::from_element(root, chunk_size)?;
    document.diagnostics.check(policy)?;
    Ok((document.to_tree(), document.diagnostics.clone()))
}

fn index_large<T, F>(
    path: &Path,
    options: StreamingOptions,
    lookup: Option<&Lookup>,
    on_chunk: F,
) -> Result<IndexSummary>
where
    T: IndexedEntity,
    F: FnMut(&ChunkReport) -> ControlFlow<()>,
{
    let document = LargeDocument::<T>::load_with_progress(path, options, on_chunk)?;
    Ok(IndexSummary::from_collection(&document.collection, lookup)
        .with_diagnostics(document.diagnostics, document.complete))
}

fn index_prerender<F>(
    path: &Path,
    keep_comments: bool,
    lookup: Option<&Lookup>,
    mut on_chunk: F,
) -> Result<IndexSummary>
where
    F: FnMut(&ChunkReport) -> ControlFlow<()>,
{
    let source = bme_xml::read_file(path, ReadOptions::default().with_comments(keep_comments))?;
    let document = Document::<Prerender>::parse(&source.root, ErrorPolicy::WarnAndContinue)?;
    let diagnostics = document.diagnostics().clone();
    let prerender = document.into_root().unwrap_or_default();

    let mut collection = IndexedCollection::<PostfxGraph>::for_entity();
    let report = collection.ingest_chunk(prerender.graphs().to_vec(), 0)?;
    let complete = on_chunk(&report).is_continue();
    Ok(IndexSummary::from_collection(&collection, lookup)
        .with_diagnostics(diagnostics, complete))
}
