//! Multiplayer class divisions: perks, helpers, indexes and transfer objects.

use bme_ingest::{IndexedCollection, LargeDocument, UNINDEXED_BUCKET};
use bme_model::{Mapper, PresenceFlag, RoundTripNode, XmlElement, structurally_equal};
use bme_schema::class_divisions::{
    EFFECT_ALTERNATIVE_EQUIPMENT, EFFECT_ARMOR_ON_SPAWN, GAME_MODE_CAPTAIN, GAME_MODE_SKIRMISH,
    MpClassDivision, PerkEffect,
};
use bme_schema::dto::{ClassDivisionMapper, ClassDivisionsDto, PerkEffectDto};

const DIVISIONS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MPClassDivisions>
  <MPClassDivision id="mp_heavy_infantry_vlandia_troop" hero="mp_heavy_infantry_vlandia_hero" troop="mp_heavy_infantry_vlandia_troop" multiplier="1" cost="120" casual_cost="110" icon="Infantry" melee_ai="70" ranged_ai="20" armor="24" movement_speed="0.85" combat_movement_speed="0.9" acceleration="1.2">
    <Perks>
      <Perk game_mode="skirmish" name="{=!}Shield Wall" description="{=!}More armor" icon="shield" perk_list="1">
        <OnSpawnEffect type="ArmorOnSpawn" value="6" target="Player"/>
        <Effect type="DamageTaken" value="-0.1"/>
        <RandomOnSpawnEffect type="AlternativeEquipmentOnSpawn" target="Player">
          <Group>
            <Item slot="Item0" item="mp_vlandian_sword"/>
            <Item slot="Item1" item="mp_heater_shield"/>
          </Group>
        </RandomOnSpawnEffect>
        <OnSpawnEffect type="AlternativeEquipmentOnSpawn" slot="Item2" item="mp_javelin"/>
      </Perk>
      <Perk game_mode="captain" name="{=!}Rally" perk_list="2">
        <Effect type="MoraleGain" value="0.2"/>
      </Perk>
    </Perks>
  </MPClassDivision>
  <MPClassDivision id="mp_light_cavalry_empire_troop" cost="160" armor="6">
    <Perks/>
  </MPClassDivision>
  <MPClassDivision id="skirmisher" cost="90"/>
</MPClassDivisions>
"#;

fn source_root() -> XmlElement {
    bme_xml::parse_str(DIVISIONS).expect("parse divisions").root
}

fn load(chunk_size: usize) -> LargeDocument<MpClassDivision> {
    LargeDocument::from_element(&source_root(), chunk_size).expect("ingest divisions")
}

fn division(document: &LargeDocument<MpClassDivision>, position: usize) -> &MpClassDivision {
    &document.collection.elements()[position]
}

#[test]
fn interleaved_perk_effects_keep_their_order() {
    let document = load(10);
    let perk = &division(&document, 0).perks()[0];
    assert_eq!(
        perk.effects.tags(),
        vec![
            "OnSpawnEffect",
            "Effect",
            "RandomOnSpawnEffect",
            "OnSpawnEffect"
        ]
    );
    assert!(perk.has_effect_type(EFFECT_ARMOR_ON_SPAWN));
    assert!(perk.has_effect_type(EFFECT_ALTERNATIVE_EQUIPMENT));

    let Some(PerkEffect::RandomOnSpawn(random)) = perk.effects.known().nth(2) else {
        panic!("third effect should be a random spawn effect");
    };
    assert_eq!(random.groups[0].items.len(), 2);
}

#[test]
fn whole_file_round_trips_in_any_chunk_size() {
    for chunk_size in [1, 2, 100] {
        let document = load(chunk_size);
        assert_eq!(document.collection.len(), 3);
        assert!(
            structurally_equal(&source_root(), &document.to_tree()),
            "chunk size {chunk_size} changed the tree"
        );
    }
}

#[test]
fn id_helpers_split_on_underscores() {
    let document = load(10);
    let heavy = division(&document, 0);
    assert_eq!(heavy.culture(), Some("infantry"));
    assert_eq!(heavy.class_type().as_deref(), Some("vlandia_troop"));

    let short = division(&document, 2);
    assert_eq!(short.culture(), None);
    assert_eq!(short.class_type(), None);
}

#[test]
fn balance_rules_weigh_cost_against_armor_and_speed() {
    let document = load(10);
    assert!(division(&document, 0).is_balanced());
    assert!(!division(&document, 1).is_balanced(), "costly and unarmored");
    assert!(division(&document, 2).is_balanced());

    let slow = MpClassDivision {
        cost: Some(bme_model::Scalar::new(120)),
        armor: Some(bme_model::Scalar::new(30)),
        movement_speed: Some(bme_model::Scalar::new(0.7)),
        ..MpClassDivision::default()
    };
    assert!(!slow.is_balanced());
    assert!(!MpClassDivision::default().is_balanced());
}

#[test]
fn game_modes_are_distinct_and_ordered() {
    let document = load(10);
    let heavy = division(&document, 0);
    assert_eq!(heavy.game_modes(), vec!["skirmish", "captain"]);
    assert!(heavy.perks()[0].applies_to(GAME_MODE_SKIRMISH));
    assert!(!heavy.perks()[0].applies_to(GAME_MODE_CAPTAIN));
}

#[test]
fn indexes_route_ids_without_culture_to_the_unindexed_bucket() {
    let document = load(2);
    let collection = &document.collection;

    let infantry: Vec<usize> = collection
        .lookup("by_culture", "infantry")
        .iter()
        .map(|element_ref| element_ref.index())
        .collect();
    assert_eq!(infantry, vec![0]);
    assert_eq!(collection.lookup("by_culture", UNINDEXED_BUCKET).len(), 1);
    assert_eq!(
        collection
            .index("by_culture")
            .map(|index| index.unindexed_count()),
        Some(1)
    );

    assert_eq!(collection.lookup("by_game_mode", "captain").len(), 1);
    assert!(collection.lookup("by_game_mode", "battle").is_empty());
}

#[test]
fn malformed_scalar_is_recorded_and_kept_raw() {
    let xml = r#"<MPClassDivisions><MPClassDivision id="mp_a_b_c" cost="cheap" armor="5"/></MPClassDivisions>"#;
    let root = bme_xml::parse_str(xml).expect("parse").root;
    let document = LargeDocument::<MpClassDivision>::from_element(&root, 10).expect("ingest");

    let errors = document.diagnostics.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "cost");
    assert_eq!(errors[0].raw_value, "cheap");

    let parsed = division(&document, 0);
    assert_eq!(parsed.armor_value(), 5);
    assert!(!parsed.has_valid_cost());
    assert_eq!(
        parsed.to_tree().attribute("cost"),
        Some("cheap"),
        "raw text written back"
    );
}

#[test]
fn empty_perks_survive_the_transfer_object() {
    let document = load(10);
    let empty = division(&document, 1);
    assert_eq!(empty.perks.presence(), PresenceFlag::PresentEmpty);

    let dto = ClassDivisionMapper::to_dto(empty);
    assert!(dto.perks.is_empty());
    assert_eq!(dto.perks_presence, Some(PresenceFlag::PresentEmpty));

    let restored = ClassDivisionMapper::to_do(&dto);
    assert_eq!(restored.perks.presence(), PresenceFlag::PresentEmpty);
    assert!(structurally_equal(&empty.to_tree(), &restored.to_tree()));
}

#[test]
fn absent_perks_stay_absent() {
    let document = load(10);
    let bare = division(&document, 2);
    let restored = ClassDivisionMapper::to_do(&ClassDivisionMapper::to_dto(bare));
    assert!(!restored.perks.is_present());
    assert!(restored.to_tree().first_element("Perks").is_none());
}

#[test]
fn perks_added_through_the_transfer_object_are_emitted() {
    let document = load(10);
    let mut dto = ClassDivisionMapper::to_dto(division(&document, 2));
    dto.perks.push(bme_schema::dto::PerkDto {
        game_mode: Some("battle".to_string()),
        effects: vec![PerkEffectDto::Effect {
            effect_type: Some("Speed".to_string()),
            value: Some("0.05".to_string()),
        }],
        ..Default::default()
    });

    let restored = ClassDivisionMapper::to_do(&dto);
    assert_eq!(restored.perks.presence(), PresenceFlag::PresentWithValues);
    let perks = restored.to_tree();
    let perk = perks
        .first_element("Perks")
        .and_then(|perks| perks.first_element("Perk"))
        .expect("perk written");
    assert_eq!(perk.attribute("game_mode"), Some("battle"));
}

#[test]
fn unedited_collection_transfer_object_preserves_every_division() {
    let document = load(10);
    let dto = ClassDivisionsDto::from_divisions(document.collection.elements());
    let json = serde_json::to_string(&dto).expect("serialize");
    let back: ClassDivisionsDto = serde_json::from_str(&json).expect("deserialize");

    for (original, restored) in document.collection.elements().iter().zip(back.to_divisions()) {
        assert!(structurally_equal(&original.to_tree(), &restored.to_tree()));
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn collections_can_be_shared_across_threads() {
    assert_send_sync::<IndexedCollection<MpClassDivision>>();
    assert_send_sync::<LargeDocument<MpClassDivision>>();
}
