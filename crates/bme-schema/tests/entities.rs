//! Round trips and indexes for the remaining file kinds.

use bme_ingest::LargeDocument;
use bme_model::{Document, ErrorPolicy, ListItem, RoundTripNode, XmlElement, structurally_equal};
use bme_schema::flora::FloraLayerSet;
use bme_schema::items::{ComponentPart, ItemEntry, Items};
use bme_schema::prerender::Prerender;
use bme_schema::terrain_materials::TerrainMaterial;
use bme_schema::weapon_descriptions::WeaponDescription;

fn root(xml: &str) -> XmlElement {
    bme_xml::parse_str(xml).expect("parse source").root
}

fn parse_document<T: RoundTripNode>(xml: &str) -> T {
    Document::<T>::parse(&root(xml), ErrorPolicy::FailFast)
        .expect("parse document")
        .into_root()
        .expect("root present")
}

const TERRAIN: &str = r#"<terrain_materials>
  <terrain_material name="grass_01" is_enabled="true" is_flora_layer="false" physics_material="grass" pitch_roll_yaw="0.000, 0.000, 0.000" elevation_amount="1.5" bigdetailmap_mode="2">
    <textures>
      <texture type="diffusemap" name="grass_01_diffuse"/>
      <texture type="normalmap" name="grass_01_normal"/>
    </textures>
    <layer_flags>
      <flag name="use_wind" value="true"/>
    </layer_flags>
  </terrain_material>
  <terrain_material name="rock_02" is_enabled="false" physics_material="stone">
    <textures>
      <texture type="diffusemap" name="rock_02_diffuse"/>
    </textures>
    <meshes>
      <mesh name="pebble_a" index="0" density="12" size_min="0.5, 0.5, 0.5" size_max="1.0, 1.0, 1.0"/>
    </meshes>
  </terrain_material>
  <terrain_material name="sand"/>
</terrain_materials>"#;

#[test]
fn terrain_materials_round_trip_and_index() {
    let document =
        LargeDocument::<TerrainMaterial>::from_element(&root(TERRAIN), 2).expect("ingest");
    assert!(structurally_equal(&root(TERRAIN), &document.to_tree()));
    assert!(document.diagnostics.is_clean());

    let materials = document.collection.elements();
    assert!(materials[0].is_enabled());
    assert!(!materials[1].is_enabled());
    assert!(materials[2].is_enabled(), "missing flag defaults to enabled");
    assert_eq!(
        materials[0]
            .texture("normalmap")
            .and_then(|texture| texture.name.as_deref()),
        Some("grass_01_normal")
    );

    let collection = &document.collection;
    assert_eq!(collection.lookup("by_physics_material", "stone").len(), 1);
    assert!(collection.lookup("by_physics_material", "sand").is_empty());
    assert_eq!(collection.lookup("by_texture", "rock_02_diffuse").len(), 1);
}

const WEAPONS: &str = r#"<WeaponDescriptions>
  <WeaponDescription id="OneHandedSword" weapon_class="OneHandedSword" item_usage_features="onehanded:block:shield: thrust">
    <WeaponFlags>
      <WeaponFlag value="MeleeWeapon"/>
    </WeaponFlags>
    <AvailablePieces>
      <AvailablePiece id="sword_blade_1"/>
      <AvailablePiece id="sword_guard_1"/>
    </AvailablePieces>
  </WeaponDescription>
  <WeaponDescription id="Bow" weapon_class="Bow" item_usage_features="bow">
    <WeaponFlags>
      <WeaponFlag value="RangedWeapon"/>
      <WeaponFlag value="NotUsableWithOneHand"/>
    </WeaponFlags>
  </WeaponDescription>
</WeaponDescriptions>"#;

#[test]
fn weapon_descriptions_round_trip_and_index() {
    let document =
        LargeDocument::<WeaponDescription>::from_element(&root(WEAPONS), 1).expect("ingest");
    assert!(structurally_equal(&root(WEAPONS), &document.to_tree()));

    let weapons = document.collection.elements();
    assert_eq!(
        weapons[0].usage_features(),
        vec!["onehanded", "block", "shield", "thrust"]
    );
    assert!(weapons[0].is_craftable());
    assert!(!weapons[0].is_ranged());
    assert!(weapons[1].is_ranged());
    assert!(weapons[1].is_two_handed());

    let collection = &document.collection;
    assert_eq!(collection.lookup("by_usage_feature", "thrust").len(), 1);
    assert_eq!(collection.lookup("by_flag", "RangedWeapon").len(), 1);
    assert_eq!(collection.lookup("by_piece", "sword_guard_1").len(), 1);
    assert_eq!(collection.lookup("by_weapon_class", "Bow").len(), 1);
}

const FLORA: &str = r#"<layer_flora_sets>
  <layer_flora_set name="meadow">
    <layer_flora>
      <mesh name="grass_tuft" index="0" density="40" seed_index="3"/>
      <mesh name="flower_red" index="1" density="4"/>
    </layer_flora>
    <layer_flora>
      <mesh name="grass_tuft" index="2" density="10"/>
    </layer_flora>
  </layer_flora_set>
  <layer_flora_set name="desert">
    <layer_flora>
      <mesh name="dry_bush" colony_radius="2.5" colony_threshold="0.4"/>
    </layer_flora>
  </layer_flora_set>
</layer_flora_sets>"#;

#[test]
fn flora_sets_round_trip_and_index_meshes() {
    let document = LargeDocument::<FloraLayerSet>::from_element(&root(FLORA), 5).expect("ingest");
    assert!(structurally_equal(&root(FLORA), &document.to_tree()));

    let meadow = &document.collection.elements()[0];
    assert_eq!(meadow.mesh_count(), 3);
    assert_eq!(meadow.mesh_names(), vec!["grass_tuft", "flower_red"]);

    let collection = &document.collection;
    assert_eq!(collection.lookup("by_mesh", "grass_tuft").len(), 1);
    assert_eq!(collection.lookup("by_name", "desert").len(), 1);
}

const PRERENDER: &str = r#"<base type="prerender">
  <postfx_graphs>
    <postfx_graph id="bloom">
      <postfx_node id="downsample" class="rglPostfx_node" shader="postfx_downsample" format="R11G11B10F" size="relative" width="0.5" height="0.5">
        <input index="0" type="provided" source="scene_color"/>
      </postfx_node>
      <postfx_node id="blur" shader="postfx_blur" compute="true" compute_tg_size_x="8" compute_tg_size_y="8">
        <input index="0" type="node" source="downsample"/>
        <preconditions>
          <config name="bloom_enabled"/>
        </preconditions>
      </postfx_node>
    </postfx_graph>
    <postfx_graph id="tonemap">
      <postfx_node id="final">
        <input index="0" type="provided" source="scene_color"/>
      </postfx_node>
    </postfx_graph>
  </postfx_graphs>
</base>"#;

#[test]
fn prerender_round_trips_and_indexes_graphs() {
    let prerender: Prerender = parse_document(PRERENDER);
    assert!(structurally_equal(&root(PRERENDER), &prerender.to_tree()));
    assert_eq!(prerender.graphs().len(), 2);

    let bloom = &prerender.graphs()[0];
    assert!(bloom.node("blur").is_some_and(|node| node.is_compute()));
    assert!(bloom.node("downsample").is_some_and(|node| !node.is_compute()));
    assert_eq!(bloom.input_sources(), vec!["scene_color", "downsample"]);

    let collection = prerender.graph_collection().expect("index graphs");
    assert_eq!(collection.lookup("by_input_source", "scene_color").len(), 2);
    assert_eq!(collection.lookup("by_id", "tonemap").len(), 1);
}

const ITEMS: &str = r#"<Items>
  <Item multiplayer_item="true" id="mp_vlandian_helmet" name="{=!}Helmet" mesh="helmet_a" culture="Culture.vlandia" weight="1.2" Type="HeadArmor">
    <ItemComponent>
      <Armor head_armor="30" has_gender_variations="false" modifier_group="plate" material_type="Plate"/>
    </ItemComponent>
    <Flags Civilian="true" UseTeamColor="false"/>
  </Item>
  <CraftedItem id="mp_sword" name="{=!}Sword" crafting_template="OneHandedSword" culture="Culture.empire">
    <Pieces>
      <Piece id="blade_1" Type="Blade" scale_factor="105"/>
      <Piece id="guard_1" Type="Guard"/>
    </Pieces>
  </CraftedItem>
  <Item id="mp_arrows" Type="Arrows">
    <ItemComponent>
      <Weapon weapon_class="Arrow" stack_amount="32" thrust_damage="5">
        <WeaponFlags Consumable="true" AmmoSticksWhenShot="true"/>
      </Weapon>
    </ItemComponent>
  </Item>
  <Item id="mp_banner" Type="Banner">
    <ItemComponent>
      <Banner banner_level="1"/>
    </ItemComponent>
  </Item>
</Items>"#;

#[test]
fn items_round_trip_with_interleaved_crafted_items() {
    let items: Items = parse_document(ITEMS);
    assert!(structurally_equal(&root(ITEMS), &items.to_tree()));
    assert_eq!(
        items.entries.tags(),
        vec!["Item", "CraftedItem", "Item", "Item"]
    );
    assert_eq!(items.items().count(), 3);
    assert_eq!(items.crafted_items().count(), 1);
    assert!(matches!(items.find("mp_sword"), Some(ItemEntry::Crafted(_))));
}

#[test]
fn item_components_dispatch_on_tag() {
    let items: Items = parse_document(ITEMS);
    let mut plain = items.items();

    let helmet = plain.next().expect("helmet");
    assert!(matches!(helmet.part(), Some(ComponentPart::Armor(_))));
    assert!(
        helmet
            .flags
            .get()
            .is_some_and(|flags| flags.is_set("Civilian") && !flags.is_set("UseTeamColor"))
    );

    let arrows = plain.next().expect("arrows");
    let Some(ComponentPart::Weapon(weapon)) = arrows.part() else {
        panic!("arrows should carry a weapon part");
    };
    assert_eq!(weapon.weapon_class.as_deref(), Some("Arrow"));
    assert!(
        weapon
            .flags
            .get()
            .is_some_and(|flags| flags.is_set("Consumable"))
    );

    let banner = plain.next().expect("banner");
    assert!(banner.part().is_none());
    let component = banner.component.get().expect("component kept");
    assert!(matches!(
        component.parts.iter().next(),
        Some(ListItem::Opaque(element)) if element.name == "Banner"
    ));
}

#[test]
fn item_type_attribute_is_not_lowercased() {
    let items: Items = parse_document(ITEMS);
    let helmet = items.items().next().expect("helmet");
    assert_eq!(helmet.item_type.as_deref(), Some("HeadArmor"));
    let tree = helmet.to_tree();
    assert_eq!(tree.attribute("Type"), Some("HeadArmor"));
    assert_eq!(tree.attribute("type"), None);
}
