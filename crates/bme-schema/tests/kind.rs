//! Schema detection, whole-file round trips and file indexing.

use std::fs;
use std::ops::ControlFlow;

use bme_ingest::StreamingOptions;
use bme_model::{ErrorPolicy, XmlElement, structural_diff};
use bme_schema::{Lookup, SchemaError, SchemaKind};

const DIVISIONS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MPClassDivisions>
  <!-- infantry -->
  <MPClassDivision id="mp_heavy_infantry_vlandia_troop" cost="120" armor="24"/>
  <MPClassDivision id="mp_light_infantry_empire_troop" cost="90">
    <Perks>
      <Perk game_mode="skirmish" name="{=!}Sprint"/>
    </Perks>
  </MPClassDivision>
  <MPClassDivision id="mp_horse_archer_khuzait_troop" cost="140"/>
</MPClassDivisions>
"#;

fn root(xml: &str) -> XmlElement {
    bme_xml::parse_str(xml).expect("parse source").root
}

#[test]
fn detect_maps_every_root_tag_back_to_its_kind() {
    for kind in SchemaKind::ALL {
        assert_eq!(SchemaKind::detect(kind.root_tag()).expect("known root"), kind);
    }
    assert_eq!(
        SchemaKind::detect("terrain_materials").expect("terrain"),
        SchemaKind::TerrainMaterials
    );
}

#[test]
fn index_names_follow_the_entity_indexes() {
    assert_eq!(
        SchemaKind::ClassDivisions.index_names(),
        ["by_culture", "by_game_mode"]
    );
    assert_eq!(
        SchemaKind::Prerender.index_names(),
        ["by_id", "by_input_source"]
    );
    for kind in SchemaKind::ALL {
        assert_eq!(kind.index_names().is_empty(), !kind.is_indexed(), "{kind}");
    }
}

#[test]
fn unknown_root_is_rejected() {
    let err = SchemaKind::detect("Kingdoms").expect_err("no schema");
    assert!(matches!(err, SchemaError::UnknownRoot { ref tag } if tag == "Kingdoms"));
    assert_eq!(err.to_string(), "no schema for root element <Kingdoms>");
}

#[test]
fn indexed_and_streamable_kinds() {
    assert!(!SchemaKind::Credits.is_indexed());
    assert!(!SchemaKind::Items.is_indexed());
    assert!(SchemaKind::Prerender.is_indexed());
    assert!(!SchemaKind::Prerender.is_streamable());
    assert!(SchemaKind::ClassDivisions.is_streamable());
    assert_eq!(SchemaKind::FloraLayerSets.to_string(), "flora_layer_sets");
}

#[test]
fn round_trip_is_structurally_identical_for_every_chunk_size() {
    let source = root(DIVISIONS);
    let kind = SchemaKind::detect(&source.name).expect("detect");
    for chunk_size in [1, 2, 50] {
        let result = kind
            .round_trip(&source, ErrorPolicy::FailFast, chunk_size)
            .expect("round trip");
        assert_eq!(result.kind, SchemaKind::ClassDivisions);
        assert!(
            structural_diff(&source, &result.tree).is_empty(),
            "chunk size {chunk_size}"
        );
        assert!(result.diagnostics.is_clean());
    }
}

#[test]
fn fail_fast_rejects_malformed_values() {
    let source = root(r#"<Credits><LoadFromFile Name="x" PlatformSpecific="maybe"/></Credits>"#);
    let err = SchemaKind::Credits
        .round_trip(&source, ErrorPolicy::FailFast, 10)
        .expect_err("malformed bool");
    assert!(matches!(err, SchemaError::Model(_)));

    let kept = SchemaKind::Credits
        .round_trip(&source, ErrorPolicy::WarnAndContinue, 10)
        .expect("warn and continue");
    assert_eq!(kept.diagnostics.len(), 1);
    assert!(structural_diff(&source, &kept.tree).is_empty());
}

#[test]
fn index_file_summarizes_buckets_and_resolves_lookups() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mpclassdivisions.xml");
    fs::write(&path, DIVISIONS).expect("write fixture");

    let mut chunks = Vec::new();
    let lookup = Lookup::new("by_culture", "infantry");
    let summary = SchemaKind::ClassDivisions
        .index_file(
            &path,
            StreamingOptions::default().with_chunk_size(2),
            Some(&lookup),
            |report| {
                chunks.push(report.chunk_index);
                ControlFlow::Continue(())
            },
        )
        .expect("index file");

    assert_eq!(chunks, vec![0, 1]);
    assert_eq!(summary.entity, "MPClassDivision");
    assert_eq!(summary.elements, 3);
    assert_eq!(summary.chunks, 2);
    assert!(summary.complete);
    assert_eq!(summary.total_unindexed(), 0);

    let by_culture = summary
        .indexes
        .iter()
        .find(|index| index.name == "by_culture")
        .expect("culture index");
    assert_eq!(
        by_culture.buckets,
        vec![("archer".to_string(), 1), ("infantry".to_string(), 2)]
    );

    let hits = summary.hits.expect("lookup hits");
    let labels: Vec<Option<&str>> = hits.iter().map(|hit| hit.label.as_deref()).collect();
    assert_eq!(
        labels,
        vec![
            Some("mp_heavy_infantry_vlandia_troop"),
            Some("mp_light_infantry_empire_troop")
        ]
    );
}

#[test]
fn index_file_stops_when_the_callback_breaks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mpclassdivisions.xml");
    fs::write(&path, DIVISIONS).expect("write fixture");

    let summary = SchemaKind::ClassDivisions
        .index_file(
            &path,
            StreamingOptions::default().with_chunk_size(1),
            None,
            |_| ControlFlow::Break(()),
        )
        .expect("index file");
    assert!(!summary.complete);
    assert_eq!(summary.elements, 1);
    assert!(summary.hits.is_none());
}

#[test]
fn documents_without_collections_cannot_be_indexed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Credits.xml");
    fs::write(&path, "<Credits/>").expect("write fixture");

    let err = SchemaKind::Credits
        .index_file(&path, StreamingOptions::default(), None, |_| {
            ControlFlow::Continue(())
        })
        .expect_err("credits are not indexed");
    assert!(matches!(err, SchemaError::NotIndexed { .. }));
}

#[test]
fn prerender_files_are_indexed_from_a_full_parse() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prerender.xml");
    fs::write(
        &path,
        r#"<base type="prerender"><postfx_graphs><postfx_graph id="bloom"><postfx_node id="a"><input index="0" type="provided" source="scene_color"/></postfx_node></postfx_graph></postfx_graphs></base>"#,
    )
    .expect("write fixture");

    let mut calls = 0;
    let summary = SchemaKind::Prerender
        .index_file(
            &path,
            StreamingOptions::default(),
            Some(&Lookup::new("by_id", "bloom")),
            |_| {
                calls += 1;
                ControlFlow::Continue(())
            },
        )
        .expect("index prerender");
    assert_eq!(calls, 1);
    assert_eq!(summary.entity, "postfx_graph");
    assert_eq!(summary.elements, 1);
    assert_eq!(
        summary.hits.map(|hits| hits.len()),
        Some(1),
        "graph found by id"
    );
    assert!(summary.complete);
}

#[test]
fn stopping_a_prerender_index_marks_it_incomplete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prerender.xml");
    fs::write(
        &path,
        r#"<base type="prerender"><postfx_graphs><postfx_graph id="bloom"/><postfx_graph id="fog"/></postfx_graphs></base>"#,
    )
    .expect("write fixture");

    let summary = SchemaKind::Prerender
        .index_file(&path, StreamingOptions::default(), None, |_| {
            ControlFlow::Break(())
        })
        .expect("index prerender");
    assert!(!summary.complete);
    assert_eq!(summary.elements, 2);
}

mod properties {
    use bme_model::{RoundTripNode, structurally_equal};
    use bme_schema::credits::{Category, CategoryItem, EmptyLine, Entry, Image, Section};
    use proptest::prelude::*;

    fn category_item() -> impl Strategy<Value = CategoryItem> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(|text| CategoryItem::Entry(Entry::new(text))),
            "[a-z]{1,8}".prop_map(|text| CategoryItem::Section(Section {
                text: Some(text),
                ..Section::default()
            })),
            Just(CategoryItem::EmptyLine(EmptyLine::default())),
            "[a-z]{1,8}".prop_map(|text| CategoryItem::Image(Image {
                text: Some(text),
                ..Image::default()
            })),
        ]
    }

    proptest! {
        #[test]
        fn category_order_survives_a_reparse(items in prop::collection::vec(category_item(), 0..12)) {
            let mut category = Category::default();
            for item in items {
                category.items.append(item);
            }
            let tree = category.to_tree();
            let mut ctx = bme_model::ParseContext::new();
            let reparsed = Category::from_tree(&tree, &mut ctx);

            prop_assert_eq!(reparsed.items.tags(), category.items.tags());
            prop_assert!(structurally_equal(&tree, &reparsed.to_tree()));
        }
    }
}
