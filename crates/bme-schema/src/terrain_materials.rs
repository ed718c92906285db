//! `terrain_materials.xml`: terrain layers with their textures, flags and
//! scattered meshes.

use bme_ingest::{IndexedEntity, SecondaryIndex};
use bme_model::{
    ElementBuilder, NodeReader, Optional, ParseContext, RoundTripNode, Scalar, Unknown, XmlBool,
    XmlElement, scalar_or,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMaterial {
    pub is_enabled: Option<Scalar<XmlBool>>,
    pub name: Option<String>,
    pub is_flora_layer: Option<Scalar<XmlBool>>,
    pub is_mesh_blend_layer: Option<Scalar<XmlBool>>,
    pub pitch_roll_yaw: Option<String>,
    pub scale: Option<String>,
    pub shear: Option<String>,
    pub position_offset: Option<String>,
    pub physics_material: Option<String>,
    pub detail_level_adjustment: Option<Scalar<f32>>,
    pub elevation_amount: Option<Scalar<f32>>,
    pub parallax_amount: Option<Scalar<f32>>,
    pub ground_slope_scale: Option<Scalar<f32>>,
    pub bigdetailmap_mode: Option<Scalar<i32>>,
    pub bigdetailmap_weight: Option<Scalar<f32>>,
    pub bigdetailmap_scale_x: Option<Scalar<f32>>,
    pub bigdetailmap_scale_y: Option<Scalar<f32>>,
    pub bigdetailmap_bias_x: Option<Scalar<f32>>,
    pub bigdetailmap_bias_y: Option<Scalar<f32>>,
    pub albedo_factor_color: Option<String>,
    pub albedo_factor_mode: Option<Scalar<i32>>,
    pub smooth_blend_amount: Option<Scalar<f32>>,
    pub textures: Optional<Textures>,
    pub layer_flags: Optional<LayerFlags>,
    pub meshes: Optional<TerrainMeshes>,
    pub unknown: Unknown,
}

impl TerrainMaterial {
    pub fn is_enabled(&self) -> bool {
        scalar_or(&self.is_enabled, XmlBool(true)).0
    }

    pub fn is_flora_layer(&self) -> bool {
        scalar_or(&self.is_flora_layer, XmlBool(false)).0
    }

    pub fn texture_names(&self) -> Vec<String> {
        self.textures
            .get()
            .map(|textures| {
                textures
                    .textures
                    .iter()
                    .filter_map(|texture| texture.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn texture(&self, texture_type: &str) -> Option<&TerrainTexture> {
        self.textures
            .get()?
            .textures
            .iter()
            .find(|texture| texture.texture_type.as_deref() == Some(texture_type))
    }
}

impl RoundTripNode for TerrainMaterial {
    const TAG: &'static str = "terrain_material";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let is_enabled = reader.scalar("is_enabled");
        let name = reader.attr("name");
        let is_flora_layer = reader.scalar("is_flora_layer");
        let is_mesh_blend_layer = reader.scalar("is_mesh_blend_layer");
        let pitch_roll_yaw = reader.attr("pitch_roll_yaw");
        let scale = reader.attr("scale");
        let shear = reader.attr("shear");
        let position_offset = reader.attr("position_offset");
        let physics_material = reader.attr("physics_material");
        let detail_level_adjustment = reader.scalar("detail_level_adjustment");
        let elevation_amount = reader.scalar("elevation_amount");
        let parallax_amount = reader.scalar("parallax_amount");
        let ground_slope_scale = reader.scalar("ground_slope_scale");
        let bigdetailmap_mode = reader.scalar("bigdetailmap_mode");
        let bigdetailmap_weight = reader.scalar("bigdetailmap_weight");
        let bigdetailmap_scale_x = reader.scalar("bigdetailmap_scale_x");
        let bigdetailmap_scale_y = reader.scalar("bigdetailmap_scale_y");
        let bigdetailmap_bias_x = reader.scalar("bigdetailmap_bias_x");
        let bigdetailmap_bias_y = reader.scalar("bigdetailmap_bias_y");
        let albedo_factor_color = reader.attr("albedo_factor_color");
        let albedo_factor_mode = reader.scalar("albedo_factor_mode");
        let smooth_blend_amount = reader.scalar("smooth_blend_amount");
        let textures = reader.optional();
        let layer_flags = reader.optional();
        let meshes = reader.optional();
        Self {
            is_enabled,
            name,
            is_flora_layer,
            is_mesh_blend_layer,
            pitch_roll_yaw,
            scale,
            shear,
            position_offset,
            physics_material,
            detail_level_adjustment,
            elevation_amount,
            parallax_amount,
            ground_slope_scale,
            bigdetailmap_mode,
            bigdetailmap_weight,
            bigdetailmap_scale_x,
            bigdetailmap_scale_y,
            bigdetailmap_bias_x,
            bigdetailmap_bias_y,
            albedo_factor_color,
            albedo_factor_mode,
            smooth_blend_amount,
            textures,
            layer_flags,
            meshes,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("is_enabled", self.is_enabled.as_ref())
            .attr("name", self.name.as_deref())
            .scalar("is_flora_layer", self.is_flora_layer.as_ref())
            .scalar("is_mesh_blend_layer", self.is_mesh_blend_layer.as_ref())
            .attr("pitch_roll_yaw", self.pitch_roll_yaw.as_deref())
            .attr("scale", self.scale.as_deref())
            .attr("shear", self.shear.as_deref())
            .attr("position_offset", self.position_offset.as_deref())
            .attr("physics_material", self.physics_material.as_deref())
            .scalar("detail_level_adjustment", self.detail_level_adjustment.as_ref())
            .scalar("elevation_amount", self.elevation_amount.as_ref())
            .scalar("parallax_amount", self.parallax_amount.as_ref())
            .scalar("ground_slope_scale", self.ground_slope_scale.as_ref())
            .scalar("bigdetailmap_mode", self.bigdetailmap_mode.as_ref())
            .scalar("bigdetailmap_weight", self.bigdetailmap_weight.as_ref())
            .scalar("bigdetailmap_scale_x", self.bigdetailmap_scale_x.as_ref())
            .scalar("bigdetailmap_scale_y", self.bigdetailmap_scale_y.as_ref())
            .scalar("bigdetailmap_bias_x", self.bigdetailmap_bias_x.as_ref())
            .scalar("bigdetailmap_bias_y", self.bigdetailmap_bias_y.as_ref())
            .attr("albedo_factor_color", self.albedo_factor_color.as_deref())
            .scalar("albedo_factor_mode", self.albedo_factor_mode.as_ref())
            .scalar("smooth_blend_amount", self.smooth_blend_amount.as_ref())
            .optional(&self.textures)
            .optional(&self.layer_flags)
            .optional(&self.meshes)
            .finish(&self.unknown)
    }
}

impl IndexedEntity for TerrainMaterial {
    const ROOT_TAG: &'static str = "terrain_materials";

    fn indexes() -> Vec<SecondaryIndex<Self>> {
        vec![
            SecondaryIndex::single("by_physics_material", |material: &TerrainMaterial| {
                material.physics_material.clone()
            }),
            SecondaryIndex::new("by_texture", |material: &TerrainMaterial| {
                Ok(material.texture_names())
            }),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Textures {
    pub textures: Vec<TerrainTexture>,
    pub unknown: Unknown,
}

impl RoundTripNode for Textures {
    const TAG: &'static str = "textures";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let textures = reader.repeated();
        Self {
            textures,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.textures)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainTexture {
    pub texture_type: Option<String>,
    pub name: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for TerrainTexture {
    const TAG: &'static str = "texture";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let texture_type = reader.attr("type");
        let name = reader.attr("name");
        Self {
            texture_type,
            name,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("type", self.texture_type.as_deref())
            .attr("name", self.name.as_deref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFlags {
    pub flags: Vec<LayerFlag>,
    pub unknown: Unknown,
}

impl RoundTripNode for LayerFlags {
    const TAG: &'static str = "layer_flags";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let flags = reader.repeated();
        Self {
            flags,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.flags)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFlag {
    pub name: Option<String>,
    pub value: Option<Scalar<XmlBool>>,
    pub unknown: Unknown,
}

impl RoundTripNode for LayerFlag {
    const TAG: &'static str = "flag";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let value = reader.scalar("value");
        Self {
            name,
            value,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .scalar("value", self.value.as_ref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainMeshes {
    pub meshes: Vec<ScatterMesh>,
    pub unknown: Unknown,
}

impl RoundTripNode for TerrainMeshes {
    const TAG: &'static str = "meshes";

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

/// A mesh scattered over a terrain or flora layer. Terrain materials and
/// flora layer sets share the shape; flora meshes also carry an `index`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterMesh {
    pub name: Option<String>,
    pub index: Option<Scalar<i32>>,
    pub density: Option<Scalar<f32>>,
    pub seed_index: Option<Scalar<i32>>,
    pub colony_radius: Option<Scalar<f32>>,
    pub colony_threshold: Option<Scalar<f32>>,
    pub size_min: Option<String>,
    pub size_max: Option<String>,
    pub albedo_multiplier: Option<String>,
    pub weight_offset: Option<Scalar<f32>>,
    pub unknown: Unknown,
}

impl RoundTripNode for ScatterMesh {
    const TAG: &'static str = "mesh";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let index = reader.scalar("index");
        let density = reader.scalar("density");
        let seed_index = reader.scalar("seed_index");
        let colony_radius = reader.scalar("colony_radius");
        let colony_threshold = reader.scalar("colony_threshold");
        let size_min = reader.attr("size_min");
        let size_max = reader.attr("size_max");
        let albedo_multiplier = reader.attr("albedo_multiplier");
        let weight_offset = reader.scalar("weight_offset");
        Self {
            name,
            index,
            density,
            seed_index,
            colony_radius,
            colony_threshold,
            size_min,
            size_max,
            albedo_multiplier,
            weight_offset,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .scalar("index", self.index.as_ref())
            .scalar("density", self.density.as_ref())
            .scalar("seed_index", self.seed_index.as_ref())
            .scalar("colony_radius", self.colony_radius.as_ref())
            .scalar("colony_threshold", self.colony_threshold.as_ref())
            .attr("size_min", self.size_min.as_deref())
            .attr("size_max", self.size_max.as_deref())
            .attr("albedo_multiplier", self.albedo_multiplier.as_deref())
            .scalar("weight_offset", self.weight_offset.as_ref())
            .finish(&self.unknown)
    }
}
