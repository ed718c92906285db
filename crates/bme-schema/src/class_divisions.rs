//! `mpclassdivisions.xml`: multiplayer troop classes and their perks.

use bme_ingest::{IndexedEntity, SecondaryIndex, UnindexableElement};
use bme_model::{
    ElementBuilder, ListVariant, NodeReader, Optional, OrderedList, ParseContext, RoundTripNode,
    Scalar, Unknown, XmlElement, scalar_or,
};

pub const GAME_MODE_SKIRMISH: &str = "skirmish";
pub const GAME_MODE_CAPTAIN: &str = "captain";
pub const GAME_MODE_ALL: &str = "all";

pub const EFFECT_ARMOR_ON_SPAWN: &str = "ArmorOnSpawn";
pub const EFFECT_ALTERNATIVE_EQUIPMENT: &str = "AlternativeEquipmentOnSpawn";

const DEFAULT_MOVEMENT_SPEED: f32 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MpClassDivision {
    pub id: Option<String>,
    pub hero: Option<String>,
    pub troop: Option<String>,
    pub hero_idle_anim: Option<String>,
    pub troop_idle_anim: Option<String>,
    pub multiplier: Option<Scalar<f32>>,
    pub cost: Option<Scalar<i32>>,
    pub casual_cost: Option<Scalar<i32>>,
    pub icon: Option<String>,
    pub melee_ai: Option<Scalar<i32>>,
    pub ranged_ai: Option<Scalar<i32>>,
    pub armor: Option<Scalar<i32>>,
    pub movement_speed: Option<Scalar<f32>>,
    pub combat_movement_speed: Option<Scalar<f32>>,
    pub acceleration: Option<Scalar<f32>>,
    pub perks: Optional<Perks>,
    pub unknown: Unknown,
}

impl MpClassDivision {
    /// Third `_`-separated segment of the id, where `mp_<role>_<culture>_...`
    /// ids keep the culture.
    pub fn culture(&self) -> Option<&str> {
        self.id.as_deref()?.split('_').nth(2)
    }

    /// Everything after the culture segment, joined back with `_`.
    pub fn class_type(&self) -> Option<String> {
        let parts: Vec<&str> = self.id.as_deref()?.split('_').collect();
        (parts.len() > 3).then(|| parts[3..].join("_"))
    }

    pub fn has_valid_cost(&self) -> bool {
        scalar_or(&self.cost, 0) > 0
    }

    pub fn armor_value(&self) -> i32 {
        scalar_or(&self.armor, 0)
    }

    pub fn movement_speed_value(&self) -> f32 {
        scalar_or(&self.movement_speed, DEFAULT_MOVEMENT_SPEED)
    }

    /// Expensive classes must pay for it with armor or speed.
    pub fn is_balanced(&self) -> bool {
        if !self.has_valid_cost() {
            return false;
        }
        let cost = scalar_or(&self.cost, 0);
        if cost > 150 && self.armor_value() < 10 {
            return false;
        }
        !(cost > 100 && self.movement_speed_value() < 0.8)
    }

    pub fn perks(&self) -> &[Perk] {
        self.perks.get().map(|perks| perks.perks.as_slice()).unwrap_or_default()
    }

    /// Distinct perk game modes in first-seen order.
    pub fn game_modes(&self) -> Vec<String> {
        let mut modes: Vec<String> = Vec::new();
        for mode in self.perks().iter().filter_map(|perk| perk.game_mode.as_deref()) {
            if !modes.iter().any(|seen| seen == mode) {
                modes.push(mode.to_string());
            }
        }
        modes
    }
}

impl RoundTripNode for MpClassDivision {
    const TAG: &'static str = "MPClassDivision";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let id = reader.attr("id");
        let hero = reader.attr("hero");
        let troop = reader.attr("troop");
        let hero_idle_anim = reader.attr("hero_idle_anim");
        let troop_idle_anim = reader.attr("troop_idle_anim");
        let multiplier = reader.scalar("multiplier");
        let cost = reader.scalar("cost");
        let casual_cost = reader.scalar("casual_cost");
        let icon = reader.attr("icon");
        let melee_ai = reader.scalar("melee_ai");
        let ranged_ai = reader.scalar("ranged_ai");
        let armor = reader.scalar("armor");
        let movement_speed = reader.scalar("movement_speed");
        let combat_movement_speed = reader.scalar("combat_movement_speed");
        let acceleration = reader.scalar("acceleration");
        let perks = reader.optional();
        Self {
            id,
            hero,
            troop,
            hero_idle_anim,
            troop_idle_anim,
            multiplier,
            cost,
            casual_cost,
            icon,
            melee_ai,
            ranged_ai,
            armor,
            movement_speed,
            combat_movement_speed,
            acceleration,
            perks,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("id", self.id.as_deref())
            .attr("hero", self.hero.as_deref())
            .attr("troop", self.troop.as_deref())
            .attr("hero_idle_anim", self.hero_idle_anim.as_deref())
            .attr("troop_idle_anim", self.troop_idle_anim.as_deref())
            .scalar("multiplier", self.multiplier.as_ref())
            .scalar("cost", self.cost.as_ref())
            .scalar("casual_cost", self.casual_cost.as_ref())
            .attr("icon", self.icon.as_deref())
            .scalar("melee_ai", self.melee_ai.as_ref())
            .scalar("ranged_ai", self.ranged_ai.as_ref())
            .scalar("armor", self.armor.as_ref())
            .scalar("movement_speed", self.movement_speed.as_ref())
            .scalar("combat_movement_speed", self.combat_movement_speed.as_ref())
            .scalar("acceleration", self.acceleration.as_ref())
            .optional(&self.perks)
            .finish(&self.unknown)
    }
}

impl IndexedEntity for MpClassDivision {
    const ROOT_TAG: &'static str = "MPClassDivisions";

    fn indexes() -> Vec<SecondaryIndex<Self>> {
        vec![
            SecondaryIndex::new("by_culture", |division: &MpClassDivision| {
                division
                    .culture()
                    .map(|culture| vec![culture.to_string()])
                    .ok_or_else(|| {
                        UnindexableElement::new(format!(
                            "id {:?} has no culture segment",
                            division.id.as_deref().unwrap_or_default()
                        ))
                    })
            }),
            SecondaryIndex::new("by_game_mode", |division: &MpClassDivision| {
                Ok(division.game_modes())
            }),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Perks {
    pub perks: Vec<Perk>,
    pub unknown: Unknown,
}

impl RoundTripNode for Perks {
    const TAG: &'static str = "Perks";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let perks = reader.repeated();
        Self {
            perks,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.perks)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Perk {
    pub game_mode: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub hero_idle_anim: Option<String>,
    pub perk_list: Option<Scalar<i32>>,
    pub effects: OrderedList<PerkEffect>,
    pub unknown: Unknown,
}

impl Perk {
    /// `all` perks apply in every mode.
    pub fn applies_to(&self, mode: &str) -> bool {
        self.game_mode
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(mode) || own == GAME_MODE_ALL)
    }

    pub fn has_effect_type(&self, effect_type: &str) -> bool {
        self.effects
            .known()
            .any(|effect| effect.effect_type() == Some(effect_type))
    }
}

impl RoundTripNode for Perk {
    const TAG: &'static str = "Perk";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let game_mode = reader.attr("game_mode");
        let name = reader.attr("name");
        let description = reader.attr("description");
        let icon = reader.attr("icon");
        let hero_idle_anim = reader.attr("hero_idle_anim");
        let perk_list = reader.scalar("perk_list");
        let effects = reader.ordered();
        Self {
            game_mode,
            name,
            description,
            icon,
            hero_idle_anim,
            perk_list,
            effects,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("game_mode", self.game_mode.as_deref())
            .attr("name", self.name.as_deref())
            .attr("description", self.description.as_deref())
            .attr("icon", self.icon.as_deref())
            .attr("hero_idle_anim", self.hero_idle_anim.as_deref())
            .scalar("perk_list", self.perk_list.as_ref())
            .ordered(&self.effects)
            .finish(&self.unknown)
    }
}

/// Effects appear in any order inside a perk.
#[derive(Debug, Clone, PartialEq)]
pub enum PerkEffect {
    OnSpawn(OnSpawnEffect),
    RandomOnSpawn(RandomOnSpawnEffect),
    Effect(Effect),
}

impl PerkEffect {
    pub fn effect_type(&self) -> Option<&str> {
        match self {
            Self::OnSpawn(effect) => effect.effect_type.as_deref(),
            Self::RandomOnSpawn(effect) => effect.effect_type.as_deref(),
            Self::Effect(effect) => effect.effect_type.as_deref(),
        }
    }
}

impl ListVariant for PerkEffect {
    fn parse_tagged(element: &XmlElement, ctx: &mut ParseContext) -> Option<Self> {
        match element.name.as_str() {
            "OnSpawnEffect" => Some(Self::OnSpawn(ctx.parse(element))),
            "RandomOnSpawnEffect" => Some(Self::RandomOnSpawn(ctx.parse(element))),
            "Effect" => Some(Self::Effect(ctx.parse(element))),
            _ => None,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::OnSpawn(_) => OnSpawnEffect::TAG,
            Self::RandomOnSpawn(_) => RandomOnSpawnEffect::TAG,
            Self::Effect(_) => Effect::TAG,
        }
    }

    fn to_tree(&self) -> XmlElement {
        match self {
            Self::OnSpawn(node) => node.to_tree(),
            Self::RandomOnSpawn(node) => node.to_tree(),
            Self::Effect(node) => node.to_tree(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnSpawnEffect {
    pub effect_type: Option<String>,
    pub value: Option<Scalar<f32>>,
    pub slot: Option<String>,
    pub item: Option<String>,
    pub target: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for OnSpawnEffect {
    const TAG: &'static str = "OnSpawnEffect";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let effect_type = reader.attr("type");
        let value = reader.scalar("value");
        let slot = reader.attr("slot");
        let item = reader.attr("item");
        let target = reader.attr("target");
        Self {
            effect_type,
            value,
            slot,
            item,
            target,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("type", self.effect_type.as_deref())
            .scalar("value", self.value.as_ref())
            .attr("slot", self.slot.as_deref())
            .attr("item", self.item.as_deref())
            .attr("target", self.target.as_deref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomOnSpawnEffect {
    pub effect_type: Option<String>,
    pub target: Option<String>,
    pub groups: Vec<Group>,
    pub unknown: Unknown,
}

impl RoundTripNode for RandomOnSpawnEffect {
    const TAG: &'static str = "RandomOnSpawnEffect";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let effect_type = reader.attr("type");
        let target = reader.attr("target");
        let groups = reader.repeated();
        Self {
            effect_type,
            target,
            groups,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("type", self.effect_type.as_deref())
            .attr("target", self.target.as_deref())
            .repeated(&self.groups)
            .finish(&self.unknown)
    }
}

/// One equipment set a random spawn effect may pick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub items: Vec<GroupItem>,
    pub unknown: Unknown,
}

impl RoundTripNode for Group {
    const TAG: &'static str = "Group";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let items = reader.repeated();
        Self {
            items,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .repeated(&self.items)
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupItem {
    pub slot: Option<String>,
    pub item: Option<String>,
    pub unknown: Unknown,
}

impl RoundTripNode for GroupItem {
    const TAG: &'static str = "Item";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let slot = reader.attr("slot");
        let item = reader.attr("item");
        Self {
            slot,
            item,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("slot", self.slot.as_deref())
            .attr("item", self.item.as_deref())
            .finish(&self.unknown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effect {
    pub effect_type: Option<String>,
    pub value: Option<Scalar<f32>>,
    pub unknown: Unknown,
}

impl RoundTripNode for Effect {
    const TAG: &'static str = "Effect";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let effect_type = reader.attr("type");
        let value = reader.scalar("value");
        Self {
            effect_type,
            value,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("type", self.effect_type.as_deref())
            .scalar("value", self.value.as_ref())
            .finish(&self.unknown)
    }
}
