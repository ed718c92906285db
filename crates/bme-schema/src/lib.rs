//! Node definitions for the Bannerlord XML files the editor opens.
//!
//! Each file kind maps onto a tree of [`bme_model::RoundTripNode`] types
//! that keep undeclared content and element order, so an unedited file is
//! written back structurally unchanged. Large entity files additionally
//! implement [`bme_ingest::IndexedEntity`] and can be loaded in chunks.

pub mod catalog;
pub mod class_divisions;
pub mod credits;
pub mod dto;
pub mod error;
pub mod flora;
pub mod items;
pub mod kind;
pub mod prerender;
pub mod terrain_materials;
pub mod weapon_descriptions;

pub use catalog::{IndexBuckets, IndexSummary, Lookup, LookupHit};
pub use class_divisions::{MpClassDivision, Perk, PerkEffect, Perks};
pub use credits::{Category, CategoryItem, Credits, CreditsItem, Entry, Section, SectionItem};
pub use error::{Result, SchemaError};
pub use flora::{FloraLayerSet, LayerFlora};
pub use items::{ComponentPart, CraftedItem, Item, ItemComponent, ItemEntry, Items};
pub use kind::{RoundTrip, SchemaKind};
pub use prerender::{PostfxGraph, PostfxNode, Prerender};
pub use terrain_materials::{ScatterMesh, TerrainMaterial};
pub use weapon_descriptions::WeaponDescription;
