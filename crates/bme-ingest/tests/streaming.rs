//! Tests for streaming ingestion of large entity files.

use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;

use bme_ingest::{
    FileSizeCategory, IndexedEntity, IngestError, LargeDocument, SecondaryIndex, StreamingOptions,
    should_use_streaming, should_use_streaming_with_threshold,
};
use bme_model::{
    ElementBuilder, NodeReader, ParseContext, RoundTripNode, Scalar, Unknown, XmlElement,
    structurally_equal,
};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
struct Material {
    name: Option<String>,
    physics: Option<String>,
    weight: Option<Scalar<f32>>,
    unknown: Unknown,
}

impl RoundTripNode for Material {
    const TAG: &'static str = "material";

    fn from_tree(element: &XmlElement, ctx: &mut ParseContext) -> Self {
        let mut reader = NodeReader::new(element, ctx);
        let name = reader.attr("name");
        let physics = reader.attr("physics");
        let weight = reader.scalar("weight");
        Self {
            name,
            physics,
            weight,
            unknown: reader.finish(),
        }
    }

    fn to_tree(&self) -> XmlElement {
        ElementBuilder::new(Self::TAG)
            .attr("name", self.name.as_deref())
            .attr("physics", self.physics.as_deref())
            .scalar("weight", self.weight.as_ref())
            .finish(&self.unknown)
    }
}

impl IndexedEntity for Material {
    const ROOT_TAG: &'static str = "materials";

    fn indexes() -> Vec<SecondaryIndex<Self>> {
        vec![SecondaryIndex::single("by_physics", |material: &Material| {
            material.physics.clone()
        })]
    }
}

fn fixture(count: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    xml.push_str("<materials version=\"2\">\n");
    for n in 0..count {
        if n == 7 {
            xml.push_str("  <settings fallback=\"stone\"/>\n");
        }
        let physics = if n % 2 == 0 { "stone" } else { "grass" };
        xml.push_str(&format!(
            "  <material name=\"m{n}\" physics=\"{physics}\" weight=\"{n}.5\">\n    <textures><texture name=\"t{n}\"/></textures>\n  </material>\n"
        ));
    }
    xml.push_str("</materials>\n");
    xml
}

fn write_fixture(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("materials.xml");
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn streaming_matches_whole_document_parsing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let xml = fixture(25);
    let path = write_fixture(&dir, &xml);

    let options = StreamingOptions::default().with_chunk_size(10);
    let streamed = LargeDocument::<Material>::load(&path, options).expect("stream");
    assert!(streamed.complete);
    assert_eq!(streamed.collection.progress().chunks, 3);

    let parsed = bme_xml::parse_str(&xml).expect("parse");
    let whole = LargeDocument::<Material>::from_element(&parsed.root, 10).expect("whole");

    assert_eq!(streamed.collection.elements(), whole.collection.elements());
    assert_eq!(
        streamed.collection.lookup("by_physics", "stone"),
        whole.collection.lookup("by_physics", "stone")
    );
    assert!(structurally_equal(&streamed.to_tree(), &parsed.root));
    assert!(structurally_equal(&whole.to_tree(), &parsed.root));
}

#[test]
fn other_root_children_keep_their_position() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, &fixture(9));
    let document = LargeDocument::<Material>::load(&path, StreamingOptions::default()).unwrap();
    let tree = document.to_tree();
    let tags: Vec<&str> = tree.elements().map(|e| e.name.as_str()).collect();
    assert_eq!(tags.iter().position(|tag| *tag == "settings"), Some(7));
    assert_eq!(tags.len(), 10);
    assert_eq!(document.root.attribute("version"), Some("2"));
    assert_eq!(document.declaration.as_ref().map(|d| d.version.as_str()), Some("1.0"));
}

#[test]
fn ingestion_can_stop_between_chunks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, &fixture(25));
    let mut seen = Vec::new();
    let document = LargeDocument::<Material>::load_with_progress(
        &path,
        StreamingOptions::default().with_chunk_size(10),
        |report| {
            seen.push(report.total_elements);
            ControlFlow::Break(())
        },
    )
    .unwrap();
    assert_eq!(seen, [10]);
    assert!(!document.complete);
    assert_eq!(document.collection.len(), 10);
}

#[test]
fn stopping_on_the_last_chunk_keeps_every_element() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, &fixture(25));
    let mut chunks = 0;
    let document = LargeDocument::<Material>::load_with_progress(
        &path,
        StreamingOptions::default().with_chunk_size(10),
        |report| {
            chunks += 1;
            if report.total_elements == 25 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        },
    )
    .unwrap();
    assert_eq!(chunks, 3);
    assert_eq!(document.collection.len(), 25);
    assert!(!document.complete);
}

#[test]
fn malformed_scalars_are_collected_across_chunks() {
    let xml = "<materials><material name=\"a\" weight=\"heavy\"/><material name=\"b\" weight=\"1.0\"/><material name=\"c\" weight=\"?\"/></materials>";
    let options = StreamingOptions::default().with_chunk_size(1);
    let document = LargeDocument::<Material>::from_reader(xml.as_bytes(), options).unwrap();
    assert_eq!(document.diagnostics.len(), 2);
    assert_eq!(document.diagnostics.errors()[0].path, "materials/material");
    assert_eq!(document.diagnostics.errors()[1].raw_value, "?");
    let first = &document.collection.elements()[0];
    assert_eq!(first.weight.as_ref().map(Scalar::raw), Some("heavy"));
}

#[test]
fn wrong_root_is_rejected() {
    let xml = "<terrain><material name=\"a\"/></terrain>";
    let err = LargeDocument::<Material>::from_reader(xml.as_bytes(), StreamingOptions::default())
        .unwrap_err();
    assert!(matches!(err, IngestError::RootMismatch { .. }));
}

#[test]
fn wrong_root_is_rejected_before_any_chunk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let xml = fixture(5).replace("materials", "terrain");
    let path = write_fixture(&dir, &xml);
    let mut chunks = 0;
    let err = LargeDocument::<Material>::load_with_progress(
        &path,
        StreamingOptions::default().with_chunk_size(1),
        |_| {
            chunks += 1;
            ControlFlow::Continue(())
        },
    )
    .unwrap_err();
    assert_eq!(chunks, 0);
    match err {
        IngestError::RootMismatch { expected, found } => {
            assert_eq!(expected, "materials");
            assert_eq!(found, "terrain");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let err = LargeDocument::<Material>::load(
        std::path::Path::new("/nonexistent/materials.xml"),
        StreamingOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
}

#[test]
fn small_files_do_not_stream() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(&dir, &fixture(3));
    assert!(!should_use_streaming(&path));
    assert!(should_use_streaming_with_threshold(&path, 16));
    assert_eq!(
        FileSizeCategory::from_path(&path).unwrap(),
        FileSizeCategory::Small
    );
}
