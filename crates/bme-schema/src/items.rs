//! `mpitems.xml`: multiplayer items and crafted items.
//!
//! An `ItemComponent` holds one part whose shape depends on its tag
//! (`Armor`, `Weapon`, `Horse` or `HorseHarness`). The tag is resolved once
//! while parsing into [`ComponentPart`]; parts with any other tag stay
//! opaque and are written back untouched.

use bme_model::{
    ElementBuilder, ListVariant, NodeReader, Optional, OrderedList, ParseContext, RoundTripNode,
    Scalar, Unknown, XmlBool, XmlElement,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Items {
    pub entries: OrderedList<ItemEntry>,
    pub unknown: Unknown,
}

impl Items {
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.known().filter_map(|entry| match entry {
            ItemEntry::Item(item) => Some(item),
            ItemEntry::Crafted(_) => None,
        })
    }

    pub fn crafted_items(&self) -> impl Iterator<Item = &CraftedItem> {
        self.entries.known().filter_map(|entry| match entry {
            ItemEntry::Crafted(item) => Some(item),
            ItemEntry::Item(_) => None,
        })
    }

    pub fn find(&self, id: &str) -> Option<&ItemEntry> {
        self.entries.known().find(|entry| entry.id() == Some(id))
    }
}

impl RoundTripNode for Items {
    const TAG: &'static str = "Items";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let entries = reader.ordered();
        Self {
            entries,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .ordered(&self.entries)
            .finish(&self.unknown)
    }
}

/// Plain and crafted items are interleaved in the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEntry {
    Item(Item),
    Crafted(CraftedItem),
}

impl ItemEntry {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Item(item) => item.id.as_deref(),
            Self::Crafted(item) => item.id.as_deref(),
        }
    }
}

impl ListVariant for ItemEntry {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            "Item" => Some(Self::Item(ctx.parse(element))),
            "CraftedItem" => Some(Self::Crafted(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Item(_) => Item::TAG,
            Self::Crafted(_) => CraftedItem::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Self::Item(node) => node.to_tree(),
            Self::Crafted(node) => node.to_tree(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub multiplayer_item: Option<Scalar<XmlBool>>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub body_name: Option<String>,
    pub shield_body_name: Option<String>,
    pub holster_body_name: Option<String>,
    pub subtype: Option<String>,
    pub mesh: Option<String>,
    pub holster_mesh: Option<String>,
    pub culture: Option<String>,
    pub using_tableau: Option<Scalar<XmlBool>>,
    pub value: Option<Scalar<i32>>,
    pub is_merchandise: Option<Scalar<XmlBool>>,
    pub weight: Option<Scalar<f32>>,
    pub difficulty: Option<Scalar<i32>>,
    pub appearance: Option<Scalar<f32>>,
    pub item_type: Option<String>,
    pub item_holsters: Option<String>,
    pub item_category: Option<String>,
    pub recalculate_body: Option<Scalar<XmlBool>>,
    pub has_lower_holster_priority: Option<Scalar<XmlBool>>,
    pub holster_position_shift: Option<String>,
    pub flying_mesh: Option<String>,
    pub holster_mesh_with_weapon: Option<String>,
    pub ammo_offset: Option<String>,
    pub prefab: Option<String>,
    pub lod_atlas_index: Option<Scalar<i32>>,
    pub component: Optional<ItemComponent>,
    pub flags: Optional<ItemFlags>,
    pub unknown: Unknown,
}

impl Item {
    pub fn part(&self) -> Option<&ComponentPart> {
        self.component.get()?.part()
    }
}

impl RoundTripNode for Item {
    const TAG: &'static str = "Item";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let multiplayer_item = reader.scalar("multiplayer_item");
        let id = reader.attr("id");
        let name = reader.attr("name");
        let body_name = reader.attr("body_name");
        let shield_body_name = reader.attr("shield_body_name");
        let holster_body_name = reader.attr("holster_body_name");
        let subtype = reader.attr("subtype");
        let mesh = reader.attr("mesh");
        let holster_mesh = reader.attr("holster_mesh");
        let culture = reader.attr("culture");
        let using_tableau = reader.scalar("using_tableau");
        let value = reader.scalar("value");
        let is_merchandise = reader.scalar("is_merchandise");
        let weight = reader.scalar("weight");
        let difficulty = reader.scalar("difficulty");
        let appearance = reader.scalar("appearance");
        let item_type = reader.attr("Type");
        let item_holsters = reader.attr("item_holsters");
        let item_category = reader.attr("item_category");
        let recalculate_body = reader.scalar("recalculate_body");
        let has_lower_holster_priority = reader.scalar("has_lower_holster_priority");
        let holster_position_shift = reader.attr("holster_position_shift");
        let flying_mesh = reader.attr("flying_mesh");
        let holster_mesh_with_weapon = reader.attr("holster_mesh_with_weapon");
        let ammo_offset = reader.attr("AmmoOffset");
        let prefab = reader.attr("prefab");
        let lod_atlas_index = reader.scalar("lod_atlas_index");
        let component = reader.optional();
        let flags = reader.optional();
        Self {
            multiplayer_item,
            id,
            name,
            body_name,
            shield_body_name,
            holster_body_name,
            subtype,
            mesh,
            holster_mesh,
            culture,
            using_tableau,
            value,
            is_merchandise,
            weight,
            difficulty,
            appearance,
            item_type,
            item_holsters,
            item_category,
            recalculate_body,
            has_lower_holster_priority,
            holster_position_shift,
            flying_mesh,
            holster_mesh_with_weapon,
            ammo_offset,
            prefab,
            lod_atlas_index,
            component,
            flags,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("multiplayer_item", self.multiplayer_item.as_ref())
            .attr("id", self.id.as_deref())
            .attr("name", self.name.as_deref())
            .attr("body_name", self.body_name.as_deref())
            .attr("shield_body_name", self.shield_body_name.as_deref())
            .attr("holster_body_name", self.holster_body_name.as_deref())
            .attr("subtype", self.subtype.as_deref())
            .attr("mesh", self.mesh.as_deref())
            .attr("holster_mesh", self.holster_mesh.as_deref())
            .attr("culture", self.culture.as_deref())
            .scalar("using_tableau", self.using_tableau.as_ref())
            .scalar("value", self.value.as_ref())
            .scalar("is_merchandise", self.is_merchandise.as_ref())
            .scalar("weight", self.weight.as_ref())
            .scalar("difficulty", self.difficulty.as_ref())
            .scalar("appearance", self.appearance.as_ref())
            .attr("Type", self.item_type.as_deref())
            .attr("item_holsters", self.item_holsters.as_deref())
            .attr("item_category", self.item_category.as_deref())
            .scalar("recalculate_body", self.recalculate_body.as_ref())
            .scalar(
                "has_lower_holster_priority",
                self.has_lower_holster_priority.as_ref(),
            )
            .attr("holster_position_shift", self.holster_position_shift.as_deref())
            .attr("flying_mesh", self.flying_mesh.as_deref())
            .attr(
                "holster_mesh_with_weapon",
                self.holster_mesh_with_weapon.as_deref(),
            )
            .attr("AmmoOffset", self.ammo_offset.as_deref())
            .attr("prefab", self.prefab.as_deref())
            .scalar("lod_atlas_index", self.lod_atlas_index.as_ref())
            .optional(&self.component)
            .optional(&self.flags)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemComponent {
    pub parts: OrderedList<ComponentPart>,
    pub unknown: Unknown,
}

impl ItemComponent {
    /// The first recognized part; the game reads only one.
    pub fn part(&self) -> Option<&ComponentPart> {
        self.parts.known().next()
    }
}

impl RoundTripNode for ItemComponent {
    const TAG: &'static str = "ItemComponent";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let parts = reader.ordered();
        Self {
            parts,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .ordered(&self.parts)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentPart {
    Armor(Armor),
    Weapon(Weapon),
    Horse(Horse),
    HorseHarness(HorseHarness),
}

impl ListVariant for ComponentPart {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            "Armor" => Some(Self::Armor(ctx.parse(element))),
            "Weapon" => Some(Self::Weapon(ctx.parse(element))),
            "Horse" => Some(Self::Horse(ctx.parse(element))),
            "HorseHarness" => Some(Self::HorseHarness(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Armor(_) => Armor::TAG,
            Self::Weapon(_) => Weapon::TAG,
            Self::Horse(_) => Horse::TAG,
            Self::HorseHarness(_) => HorseHarness::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Self::Armor(node) => node.to_tree(),
            Self::Weapon(node) => node.to_tree(),
            Self::Horse(node) => node.to_tree(),
            Self::HorseHarness(node) => node.to_tree(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Armor {
    pub head_armor: Option<Scalar<i32>>,
    pub body_armor: Option<Scalar<i32>>,
    pub leg_armor: Option<Scalar<i32>>,
    pub arm_armor: Option<Scalar<i32>>,
    pub has_gender_variations: Option<Scalar<XmlBool>>,
    pub hair_cover_type: Option<String>,
    pub beard_cover_type: Option<String>,
    pub modifier_group: Option<String>,
    pub material_type: Option<String>,
    pub covers_body: Option<Scalar<XmlBool>>,
    pub covers_legs: Option<Scalar<XmlBool>>,
    pub covers_head: Option<Scalar<XmlBool>>,
    pub mane_cover_type: Option<String>,
    pub reins_mesh: Option<String>,
    pub maneuver_bonus: Option<Scalar<i32>>,
    pub speed_bonus: Option<Scalar<i32>>,
    pub charge_bonus: Option<Scalar<i32>>,
    pub family_type: Option<Scalar<i32>>,
    pub covers_hands: Option<Scalar<XmlBool>>,
    pub body_mesh_type: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for Armor {
    const TAG: &'static str = "Armor";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let head_armor = reader.scalar("head_armor");
        let body_armor = reader.scalar("body_armor");
        let leg_armor = reader.scalar("leg_armor");
        let arm_armor = reader.scalar("arm_armor");
        let has_gender_variations = reader.scalar("has_gender_variations");
        let hair_cover_type = reader.attr("hair_cover_type");
        let beard_cover_type = reader.attr("beard_cover_type");
        let modifier_group = reader.attr("modifier_group");
        let material_type = reader.attr("material_type");
        let covers_body = reader.scalar("covers_body");
        let covers_legs = reader.scalar("covers_legs");
        let covers_head = reader.scalar("covers_head");
        let mane_cover_type = reader.attr("mane_cover_type");
        let reins_mesh = reader.attr("reins_mesh");
        let maneuver_bonus = reader.scalar("maneuver_bonus");
        let speed_bonus = reader.scalar("speed_bonus");
        let charge_bonus = reader.scalar("charge_bonus");
        let family_type = reader.scalar("family_type");
        let covers_hands = reader.scalar("covers_hands");
        let body_mesh_type = reader.attr("body_mesh_type");
        Self {
            head_armor,
            body_armor,
            leg_armor,
            arm_armor,
            has_gender_variations,
            hair_cover_type,
            beard_cover_type,
            modifier_group,
            material_type,
            covers_body,
            covers_legs,
            covers_head,
            mane_cover_type,
            reins_mesh,
            maneuver_bonus,
            speed_bonus,
            charge_bonus,
            family_type,
            covers_hands,
            body_mesh_type,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("head_armor", self.head_armor.as_ref())
            .scalar("body_armor", self.body_armor.as_ref())
            .scalar("leg_armor", self.leg_armor.as_ref())
            .scalar("arm_armor", self.arm_armor.as_ref())
            .scalar("has_gender_variations", self.has_gender_variations.as_ref())
            .attr("hair_cover_type", self.hair_cover_type.as_deref())
            .attr("beard_cover_type", self.beard_cover_type.as_deref())
            .attr("modifier_group", self.modifier_group.as_deref())
            .attr("material_type", self.material_type.as_deref())
            .scalar("covers_body", self.covers_body.as_ref())
            .scalar("covers_legs", self.covers_legs.as_ref())
            .scalar("covers_head", self.covers_head.as_ref())
            .attr("mane_cover_type", self.mane_cover_type.as_deref())
            .attr("reins_mesh", self.reins_mesh.as_deref())
            .scalar("maneuver_bonus", self.maneuver_bonus.as_ref())
            .scalar("speed_bonus", self.speed_bonus.as_ref())
            .scalar("charge_bonus", self.charge_bonus.as_ref())
            .scalar("family_type", self.family_type.as_ref())
            .scalar("covers_hands", self.covers_hands.as_ref())
            .attr("body_mesh_type", self.body_mesh_type.as_deref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weapon {
    pub weapon_class: Option<String>,
    pub ammo_class: Option<String>,
    pub stack_amount: Option<Scalar<i32>>,
    pub weapon_balance: Option<Scalar<f32>>,
    pub thrust_speed: Option<Scalar<i32>>,
    pub speed_rating: Option<Scalar<i32>>,
    pub missile_speed: Option<Scalar<i32>>,
    pub accuracy: Option<Scalar<i32>>,
    pub physics_material: Option<String>,
    pub weapon_length: Option<Scalar<i32>>,
    pub swing_damage: Option<Scalar<i32>>,
    pub thrust_damage: Option<Scalar<i32>>,
    pub swing_damage_type: Option<String>,
    pub thrust_damage_type: Option<String>,
    pub item_usage: Option<String>,
    pub flying_sound_code: Option<String>,
    pub sticking_rotation: Option<String>,
    pub sticking_position: Option<String>,
    pub center_of_mass: Option<String>,
    pub position: Option<String>,
    pub rotation: Option<String>,
    pub hit_points: Option<Scalar<i32>>,
    pub ammo_limit: Option<Scalar<i32>>,
    pub passby_sound_code: Option<String>,
    pub reload_phase_count: Option<Scalar<i32>>,
    pub modifier_group: Option<String>,
    pub body_armor: Option<Scalar<i32>>,
    pub trail_particle_name: Option<String>,
    pub rotation_speed: Option<String>,
    pub flags: Optional<WeaponFlagSet>,
    pub unknown: Unknown,
}

impl RoundTripNode for Weapon {
    const TAG: &'static str = "Weapon";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let weapon_class = reader.attr("weapon_class");
        let ammo_class = reader.attr("ammo_class");
        let stack_amount = reader.scalar("stack_amount");
        let weapon_balance = reader.scalar("weapon_balance");
        let thrust_speed = reader.scalar("thrust_speed");
        let speed_rating = reader.scalar("speed_rating");
        let missile_speed = reader.scalar("missile_speed");
        let accuracy = reader.scalar("accuracy");
        let physics_material = reader.attr("physics_material");
        let weapon_length = reader.scalar("weapon_length");
        let swing_damage = reader.scalar("swing_damage");
        let thrust_damage = reader.scalar("thrust_damage");
        let swing_damage_type = reader.attr("swing_damage_type");
        let thrust_damage_type = reader.attr("thrust_damage_type");
        let item_usage = reader.attr("item_usage");
        let flying_sound_code = reader.attr("flying_sound_code");
        let sticking_rotation = reader.attr("sticking_rotation");
        let sticking_position = reader.attr("sticking_position");
        let center_of_mass = reader.attr("center_of_mass");
        let position = reader.attr("position");
        let rotation = reader.attr("rotation");
        let hit_points = reader.scalar("hit_points");
        let ammo_limit = reader.scalar("ammo_limit");
        let passby_sound_code = reader.attr("passby_sound_code");
        let reload_phase_count = reader.scalar("reload_phase_count");
        let modifier_group = reader.attr("modifier_group");
        let body_armor = reader.scalar("body_armor");
        let trail_particle_name = reader.attr("trail_particle_name");
        let rotation_speed = reader.attr("rotation_speed");
        let flags = reader.optional();
        Self {
            weapon_class,
            ammo_class,
            stack_amount,
            weapon_balance,
            thrust_speed,
            speed_rating,
            missile_speed,
            accuracy,
            physics_material,
            weapon_length,
            swing_damage,
            thrust_damage,
            swing_damage_type,
            thrust_damage_type,
            item_usage,
            flying_sound_code,
            sticking_rotation,
            sticking_position,
            center_of_mass,
            position,
            rotation,
            hit_points,
            ammo_limit,
            passby_sound_code,
            reload_phase_count,
            modifier_group,
            body_armor,
            trail_particle_name,
            rotation_speed,
            flags,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("weapon_class", self.weapon_class.as_deref())
            .attr("ammo_class", self.ammo_class.as_deref())
            .scalar("stack_amount", self.stack_amount.as_ref())
            .scalar("weapon_balance", self.weapon_balance.as_ref())
            .scalar("thrust_speed", self.thrust_speed.as_ref())
            .scalar("speed_rating", self.speed_rating.as_ref())
            .scalar("missile_speed", self.missile_speed.as_ref())
            .scalar("accuracy", self.accuracy.as_ref())
            .attr("physics_material", self.physics_material.as_deref())
            .scalar("weapon_length", self.weapon_length.as_ref())
            .scalar("swing_damage", self.swing_damage.as_ref())
            .scalar("thrust_damage", self.thrust_damage.as_ref())
            .attr("swing_damage_type", self.swing_damage_type.as_deref())
            .attr("thrust_damage_type", self.thrust_damage_type.as_deref())
            .attr("item_usage", self.item_usage.as_deref())
            .attr("flying_sound_code", self.flying_sound_code.as_deref())
            .attr("sticking_rotation", self.sticking_rotation.as_deref())
            .attr("sticking_position", self.sticking_position.as_deref())
            .attr("center_of_mass", self.center_of_mass.as_deref())
            .attr("position", self.position.as_deref())
            .attr("rotation", self.rotation.as_deref())
            .scalar("hit_points", self.hit_points.as_ref())
            .scalar("ammo_limit", self.ammo_limit.as_ref())
            .attr("passby_sound_code", self.passby_sound_code.as_deref())
            .scalar("reload_phase_count", self.reload_phase_count.as_ref())
            .attr("modifier_group", self.modifier_group.as_deref())
            .scalar("body_armor", self.body_armor.as_ref())
            .attr("trail_particle_name", self.trail_particle_name.as_deref())
            .attr("rotation_speed", self.rotation_speed.as_deref())
            .optional(&self.flags)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Horse {
    pub speed: Option<Scalar<i32>>,
    pub maneuver: Option<Scalar<i32>>,
    pub charge_damage: Option<Scalar<i32>>,
    pub hit_points: Option<Scalar<i32>>,
    pub body_length: Option<Scalar<i32>>,
    pub is_mountable: Option<Scalar<XmlBool>>,
    pub monster: Option<String>,
    pub extra_health: Option<Scalar<i32>>,
    pub skeleton_scale: Option<String>,
    pub modifier_group: Option<String>,
    pub additional_meshes: Optional<AdditionalMeshes>,
    pub materials: Optional<Materials>,
    pub unknown: Unknown,
}

impl RoundTripNode for Horse {
    const TAG: &'static str = "Horse";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let speed = reader.scalar("speed");
        let maneuver = reader.scalar("maneuver");
        let charge_damage = reader.scalar("charge_damage");
        let hit_points = reader.scalar("hit_points");
        let body_length = reader.scalar("body_length");
        let is_mountable = reader.scalar("is_mountable");
        let monster = reader.attr("monster");
        let extra_health = reader.scalar("extra_health");
        let skeleton_scale = reader.attr("skeleton_scale");
        let modifier_group = reader.attr("modifier_group");
        let additional_meshes = reader.optional();
        let materials = reader.optional();
        Self {
            speed,
            maneuver,
            charge_damage,
            hit_points,
            body_length,
            is_mountable,
            monster,
            extra_health,
            skeleton_scale,
            modifier_group,
            additional_meshes,
            materials,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("speed", self.speed.as_ref())
            .scalar("maneuver", self.maneuver.as_ref())
            .scalar("charge_damage", self.charge_damage.as_ref())
            .scalar("hit_points", self.hit_points.as_ref())
            .scalar("body_length", self.body_length.as_ref())
            .scalar("is_mountable", self.is_mountable.as_ref())
            .attr("monster", self.monster.as_deref())
            .scalar("extra_health", self.extra_health.as_ref())
            .attr("skeleton_scale", self.skeleton_scale.as_deref())
            .attr("modifier_group", self.modifier_group.as_deref())
            .optional(&self.additional_meshes)
            .optional(&self.materials)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalMeshes {
    pub meshes: Vec<AdditionalMesh>,
    pub unknown: Unknown,
}

impl RoundTripNode for AdditionalMeshes {
    const TAG: &'static str = "AdditionalMeshes";

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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalMesh {
    pub name: Option<String>,
    pub affected_by_cover: Option<Scalar<XmlBool>>,
    pub unknown: Unknown,
}

impl RoundTripNode for AdditionalMesh {
    const TAG: &'static str = "Mesh";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let affected_by_cover = reader.scalar("affected_by_cover");
        Self {
            name,
            affected_by_cover,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .scalar("affected_by_cover", self.affected_by_cover.as_ref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Materials {
    pub materials: Vec<Material>,
    pub unknown: Unknown,
}

impl RoundTripNode for Materials {
    const TAG: &'static str = "Materials";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let materials = reader.repeated();
        Self {
            materials,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.materials)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub multipliers: Optional<MeshMultipliers>,
    pub unknown: Unknown,
}

impl RoundTripNode for Material {
    const TAG: &'static str = "Material";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let multipliers = reader.optional();
        Self {
            name,
            multipliers,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .optional(&self.multipliers)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshMultipliers {
    pub multipliers: Vec<MeshMultiplier>,
    pub unknown: Unknown,
}

impl RoundTripNode for MeshMultipliers {
    const TAG: &'static str = "MeshMultipliers";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let multipliers = reader.repeated();
        Self {
            multipliers,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.multipliers)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshMultiplier {
    pub mesh_multiplier: Option<String>,
    pub percentage: Option<Scalar<f32>>,
    pub unknown: Unknown,
}

impl RoundTripNode for MeshMultiplier {
    const TAG: &'static str = "MeshMultiplier";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let mesh_multiplier = reader.attr("mesh_multiplier");
        let percentage = reader.scalar("percentage");
        Self {
            mesh_multiplier,
            percentage,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("mesh_multiplier", self.mesh_multiplier.as_deref())
            .scalar("percentage", self.percentage.as_ref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorseHarness {
    pub body_armor: Option<Scalar<i32>>,
    pub modifier_group: Option<String>,
    pub material_type: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for HorseHarness {
    const TAG: &'static str = "HorseHarness";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let body_armor = reader.scalar("body_armor");
        let modifier_group = reader.attr("modifier_group");
        let material_type = reader.attr("material_type");
        Self {
            body_armor,
            modifier_group,
            material_type,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("body_armor", self.body_armor.as_ref())
            .attr("modifier_group", self.modifier_group.as_deref())
            .attr("material_type", self.material_type.as_deref())
            .finish(&self.unknown)
    }
}

/// One boolean attribute of a flag element.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFlag {
    pub name: String,
    pub value: Scalar<XmlBool>,
}

impl NamedFlag {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            value: Scalar::new(XmlBool(enabled)),
        }
    }

    pub fn is_set(&self) -> bool {
        self.value.get_or(XmlBool(false)).0
    }
}

/// Every attribute of a flag element is a flag; the set is open-ended.
fn read_flags(reader: &mut NodeReader<'_>) -> Vec<NamedFlag> {
    let names: Vec<String> = reader
        .element()
        .attributes
        .iter()
        .filter(|attr| !attr.is_namespace_declaration())
        .map(|attr| attr.name.clone())
        .collect();
    names
        .into_iter()
        .filter_map(|name| {
            let value = reader.scalar::<XmlBool>(&name)?;
            Some(NamedFlag { name, value })
        })
        .collect()
}

fn write_flags(tag: &str, flags: &[NamedFlag], unknown: &Unknown) -> XmlElement {
    flags
        .iter()
        .fold(ElementBuilder::new(tag), |builder, flag| {
            builder.scalar(&flag.name, Some(&flag.value))
        })
        .finish(unknown)
}

fn flag_is_set(flags: &[NamedFlag], name: &str) -> bool {
    flags.iter().any(|flag| flag.name == name && flag.is_set())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFlags {
    pub flags: Vec<NamedFlag>,
    pub unknown: Unknown,
}

impl ItemFlags {
    pub fn is_set(&self, name: &str) -> bool {
        flag_is_set(&self.flags, name)
    }
}

impl RoundTripNode for ItemFlags {
    const TAG: &'static str = "Flags";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let flags = read_flags(&mut reader);
        Self {
            flags,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        write_flags(Self::TAG, &self.flags, &self.unknown)
    }
}

/// `WeaponFlags` inside an item's `Weapon`, written as attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponFlagSet {
    pub flags: Vec<NamedFlag>,
    pub unknown: Unknown,
}

impl WeaponFlagSet {
    pub fn is_set(&self, name: &str) -> bool {
        flag_is_set(&self.flags, name)
    }
}

impl RoundTripNode for WeaponFlagSet {
    const TAG: &'static str = "WeaponFlags";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let flags = read_flags(&mut reader);
        Self {
            flags,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        write_flags(Self::TAG, &self.flags, &self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CraftedItem {
    pub multiplayer_item: Option<Scalar<XmlBool>>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub crafting_template: Option<String>,
    pub value: Option<Scalar<i32>>,
    pub is_merchandise: Option<Scalar<XmlBool>>,
    pub culture: Option<String>,
    pub pieces: Optional<Pieces>,
    pub unknown: Unknown,
}

impl RoundTripNode for CraftedItem {
    const TAG: &'static str = "CraftedItem";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let multiplayer_item = reader.scalar("multiplayer_item");
        let id = reader.attr("id");
        let name = reader.attr("name");
        let crafting_template = reader.attr("crafting_template");
        let value = reader.scalar("value");
        let is_merchandise = reader.scalar("is_merchandise");
        let culture = reader.attr("culture");
        let pieces = reader.optional();
        Self {
            multiplayer_item,
            id,
            name,
            crafting_template,
            value,
            is_merchandise,
            culture,
            pieces,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .scalar("multiplayer_item", self.multiplayer_item.as_ref())
            .attr("id", self.id.as_deref())
            .attr("name", self.name.as_deref())
            .attr("crafting_template", self.crafting_template.as_deref())
            .scalar("value", self.value.as_ref())
            .scalar("is_merchandise", self.is_merchandise.as_ref())
            .attr("culture", self.culture.as_deref())
            .optional(&self.pieces)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pieces {
    pub pieces: Vec<Piece>,
    pub unknown: Unknown,
}

impl RoundTripNode for Pieces {
    const TAG: &'static str = "Pieces";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let pieces = reader.repeated();
        Self {
            pieces,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.pieces)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Piece {
    pub id: Option<String>,
    pub piece_type: Option<String>,
    pub scale_factor: Option<Scalar<i32>>,
    pub unknown: Unknown,
}

impl RoundTripNode for Piece {
    const TAG: &'static str = "Piece";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let id = reader.attr("id");
        let piece_type = reader.attr("Type");
        let scale_factor = reader.scalar("scale_factor");
        Self {
            id,
            piece_type,
            scale_factor,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("id", self.id.as_deref())
            .attr("Type", self.piece_type.as_deref())
            .scalar("scale_factor", self.scale_factor.as_ref())
            .finish(&self.unknown)
    }
}
