//! `flora_layer_sets.xml`.

use bme_ingest::{IndexedEntity, SecondaryIndex};
use bme_model::{ElementBuilder, NodeReader, ParseContext, RoundTripNode, Unknown, XmlElement};

use crate::terrain_materials::ScatterMesh;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloraLayerSet {
    pub name: Option<String>,
    pub layers: Vec<LayerFlora>,
    pub unknown: Unknown,
}

impl FloraLayerSet {
    /// Mesh names across every layer, without repeats, in document order.
    pub fn mesh_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for mesh in self.layers.iter().flat_map(|layer| &layer.meshes) {
            if let Some(name) = &mesh.name
                && !names.contains(name)
            {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn mesh_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.meshes.len()).sum()
    }
}

impl RoundTripNode for FloraLayerSet {
    const TAG: &'static str = "layer_flora_set";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let layers = reader.repeated();
        Self {
            name,
            layers,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .repeated(&self.layers)
            .finish(&self.unknown)
    }
}

impl IndexedEntity for FloraLayerSet {
    const ROOT_TAG: &'static str = "layer_flora_sets";

    fn indexes() -> Vec<SecondaryIndex<Self>> {
        vec![
            SecondaryIndex::single("by_name", |set: &FloraLayerSet| set.name.clone()),
            SecondaryIndex::new("by_mesh", |set: &FloraLayerSet| Ok(set.mesh_names())),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFlora {
    pub meshes: Vec<ScatterMesh>,
    pub unknown: Unknown,
}

impl RoundTripNode for LayerFlora {
    const TAG: &'static str = "layer_flora";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let meshes = reader.repeated();
        Self {
            meshes,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.meshes)
            .finish(&self.unknown)
    }
}
