use bme_model::{Mapper, Optional, PresenceFlag, rederive_presence};
use serde::{Deserialize, Serialize};

use super::{raw, scalar};
use crate::class_divisions::{
    Effect, Group, GroupItem, MpClassDivision, OnSpawnEffect, Perk, PerkEffect, Perks,
    RandomOnSpawnEffect,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDivisionsDto {
    pub divisions: Vec<ClassDivisionDto>,
}

impl ClassDivisionsDto {
    pub fn from_divisions<'a>(divisions: impl IntoIterator<Item = &'a MpClassDivision>) -> Self {
        Self {
            divisions: divisions
                .into_iter()
                .map(ClassDivisionMapper::to_dto)
                .collect(),
        }
    }

    pub fn to_divisions(&self) -> Vec<MpClassDivision> {
        self.divisions
            .iter()
            .map(ClassDivisionMapper::to_do)
            .collect()
    }
}

/// A class division with its optional `Perks` wrapper collapsed into a
/// plain list.
///
/// `perks_presence` remembers whether the wrapper existed, so an empty
/// `<Perks/>` survives the trip and a missing one is not invented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDivisionDto {
    pub id: Option<String>,
    pub hero: Option<String>,
    pub troop: Option<String>,
    pub hero_idle_anim: Option<String>,
    pub troop_idle_anim: Option<String>,
    pub multiplier: Option<String>,
    pub cost: Option<String>,
    pub casual_cost: Option<String>,
    pub icon: Option<String>,
    pub melee_ai: Option<String>,
    pub ranged_ai: Option<String>,
    pub armor: Option<String>,
    pub movement_speed: Option<String>,
    pub combat_movement_speed: Option<String>,
    pub acceleration: Option<String>,
    pub perks: Vec<PerkDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perks_presence: Option<PresenceFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerkDto {
    pub game_mode: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub hero_idle_anim: Option<String>,
    pub perk_list: Option<String>,
    pub effects: Vec<PerkEffectDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerkEffectDto {
    OnSpawn {
        #[serde(rename = "type")]
        effect_type: Option<String>,
        value: Option<String>,
        slot: Option<String>,
        item: Option<String>,
        target: Option<String>,
    },
    RandomOnSpawn {
        #[serde(rename = "type")]
        effect_type: Option<String>,
        target: Option<String>,
        groups: Vec<Vec<GroupItemDto>>,
    },
    Effect {
        #[serde(rename = "type")]
        effect_type: Option<String>,
        value: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupItemDto {
    pub slot: Option<String>,
    pub item: Option<String>,
}

pub struct ClassDivisionMapper;

impl Mapper for ClassDivisionMapper {
    type Do = MpClassDivision;
    type Dto = ClassDivisionDto;

    fn to_dto(source: &MpClassDivision) -> ClassDivisionDto {
        ClassDivisionDto {
            id: source.id.clone(),
            hero: source.hero.clone(),
            troop: source.troop.clone(),
            hero_idle_anim: source.hero_idle_anim.clone(),
            troop_idle_anim: source.troop_idle_anim.clone(),
            multiplier: raw(source.multiplier.as_ref()),
            cost: raw(source.cost.as_ref()),
            casual_cost: raw(source.casual_cost.as_ref()),
            icon: source.icon.clone(),
            melee_ai: raw(source.melee_ai.as_ref()),
            ranged_ai: raw(source.ranged_ai.as_ref()),
            armor: raw(source.armor.as_ref()),
            movement_speed: raw(source.movement_speed.as_ref()),
            combat_movement_speed: raw(source.combat_movement_speed.as_ref()),
            acceleration: raw(source.acceleration.as_ref()),
            perks: source.perks().iter().map(perk_to_dto).collect(),
            perks_presence: Some(source.perks.presence()),
        }
    }

    fn to_do(source: &ClassDivisionDto) -> MpClassDivision {
        let presence = rederive_presence(source.perks_presence, source.perks.len());
        let perks = Perks {
            perks: source.perks.iter().map(perk_to_do).collect(),
            ..Perks::default()
        };
        MpClassDivision {
            id: source.id.clone(),
            hero: source.hero.clone(),
            troop: source.troop.clone(),
            hero_idle_anim: source.hero_idle_anim.clone(),
            troop_idle_anim: source.troop_idle_anim.clone(),
            multiplier: scalar(source.multiplier.as_ref()),
            cost: scalar(source.cost.as_ref()),
            casual_cost: scalar(source.casual_cost.as_ref()),
            icon: source.icon.clone(),
            melee_ai: scalar(source.melee_ai.as_ref()),
            ranged_ai: scalar(source.ranged_ai.as_ref()),
            armor: scalar(source.armor.as_ref()),
            movement_speed: scalar(source.movement_speed.as_ref()),
            combat_movement_speed: scalar(source.combat_movement_speed.as_ref()),
            acceleration: scalar(source.acceleration.as_ref()),
            perks: Optional::rebuild(presence, Some(perks)),
            ..MpClassDivision::default()
        }
    }
}

fn perk_to_dto(perk: &Perk) -> PerkDto {
    PerkDto {
        game_mode: perk.game_mode.clone(),
        name: perk.name.clone(),
        description: perk.description.clone(),
        icon: perk.icon.clone(),
        hero_idle_anim: perk.hero_idle_anim.clone(),
        perk_list: raw(perk.perk_list.as_ref()),
        effects: perk.effects.known().map(effect_to_dto).collect(),
    }
}

fn perk_to_do(perk: &PerkDto) -> Perk {
    Perk {
        game_mode: perk.game_mode.clone(),
        name: perk.name.clone(),
        description: perk.description.clone(),
        icon: perk.icon.clone(),
        hero_idle_anim: perk.hero_idle_anim.clone(),
        perk_list: scalar(perk.perk_list.as_ref()),
        effects: perk.effects.iter().map(effect_to_do).collect(),
        ..Perk::default()
    }
}

fn effect_to_dto(effect: &PerkEffect) -> PerkEffectDto {
    match effect {
        PerkEffect::OnSpawn(effect) => PerkEffectDto::OnSpawn {
            effect_type: effect.effect_type.clone(),
            value: raw(effect.value.as_ref()),
            slot: effect.slot.clone(),
            item: effect.item.clone(),
            target: effect.target.clone(),
        },
        PerkEffect::RandomOnSpawn(effect) => PerkEffectDto::RandomOnSpawn {
            effect_type: effect.effect_type.clone(),
            target: effect.target.clone(),
            groups: effect
                .groups
                .iter()
                .map(|group| {
                    group
                        .items
                        .iter()
                        .map(|item| GroupItemDto {
                            slot: item.slot.clone(),
                            item: item.item.clone(),
                        })
                        .collect()
                })
                .collect(),
        },
        PerkEffect::Effect(effect) => PerkEffectDto::Effect {
            effect_type: effect.effect_type.clone(),
            value: raw(effect.value.as_ref()),
        },
    }
}

fn effect_to_do(effect: &PerkEffectDto) -> PerkEffect {
    match effect {
        PerkEffectDto::OnSpawn {
            effect_type,
            value,
            slot,
            item,
            target,
        } => PerkEffect::OnSpawn(OnSpawnEffect {
            effect_type: effect_type.clone(),
            value: scalar(value.as_ref()),
            slot: slot.clone(),
            item: item.clone(),
            target: target.clone(),
            ..OnSpawnEffect::default()
        }),
        PerkEffectDto::RandomOnSpawn {
            effect_type,
            target,
            groups,
        } => PerkEffect::RandomOnSpawn(RandomOnSpawnEffect {
            effect_type: effect_type.clone(),
            target: target.clone(),
            groups: groups
                .iter()
                .map(|items| Group {
                    items: items
                        .iter()
                        .map(|item| GroupItem {
                            slot: item.slot.clone(),
                            item: item.item.clone(),
                            ..GroupItem::default()
                        })
                        .collect(),
                    ..Group::default()
                })
                .collect(),
            ..RandomOnSpawnEffect::default()
        }),
        PerkEffectDto::Effect { effect_type, value } => PerkEffect::Effect(Effect {
            effect_type: effect_type.clone(),
            value: scalar(value.as_ref()),
            ..Effect::default()
        }),
    }
}
