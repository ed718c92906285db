//! Tests for reading and writing XML documents.

use bme_model::{XmlElement, structurally_equal};
use bme_xml::{
    Indent, ReadOptions, WriteOptions, XmlError, element_to_string, parse_str, read_file,
    root_name, sha256_hex, to_string, write_file,
};

const CREDITS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
    "<Credits>\n",
    "  <Category Text=\"{=!}Developers\">\n",
    "    <Section Text=\"Design\"/>\n",
    "    <Entry Text=\"Alice &amp; Bob\"/>\n",
    "    <EmptyLine/>\n",
    "    <Entry Text=\"Carol\"/>\n",
    "  </Category>\n",
    "</Credits>\n",
);

#[test]
fn unedited_document_is_byte_identical() {
    let document = parse_str(CREDITS).expect("parse credits");
    let declaration = document.declaration.as_ref().expect("declaration");
    assert_eq!(declaration.version, "1.0");
    assert_eq!(declaration.encoding.as_deref(), Some("utf-8"));

    let written = to_string(&document, WriteOptions::matching(CREDITS)).expect("write");
    assert_eq!(written, CREDITS);
    assert_eq!(sha256_hex(written.as_bytes()), sha256_hex(CREDITS.as_bytes()));
}

#[test]
fn apostrophes_in_attributes_are_written_as_is() {
    let source = concat!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
        "<Credits>\n",
        "  <Entry Text=\"Don't stop\"/>\n",
        "  <Entry Text=\"O'Brien\"/>\n",
        "</Credits>\n",
    );
    let document = parse_str(source).expect("parse credits");
    let written = to_string(&document, WriteOptions::matching(source)).expect("write");
    assert_eq!(written, source);
}

#[test]
fn quotes_in_text_are_written_as_is() {
    let source = r#"<a>say "hi" and don't &amp; go</a>"#;
    let document = parse_str(source).expect("parse text");
    let written = to_string(&document, WriteOptions::matching(source)).expect("write");
    assert_eq!(written, source);
}

#[test]
fn attribute_values_are_decoded() {
    let document = parse_str(CREDITS).expect("parse credits");
    let category = document.root.first_element("Category").expect("category");
    let names: Vec<&str> = category
        .elements()
        .filter_map(|e| e.attribute("Text"))
        .collect();
    assert_eq!(names, ["Design", "Alice & Bob", "Carol"]);
}

#[test]
fn compact_output_snapshot() {
    let document = parse_str(CREDITS).expect("parse credits");
    let written = element_to_string(&document.root, WriteOptions::compact()).expect("write");
    insta::assert_snapshot!(written, @r#"<Credits><Category Text="{=!}Developers"><Section Text="Design"/><Entry Text="Alice &amp; Bob"/><EmptyLine/><Entry Text="Carol"/></Category></Credits>"#);
}

#[test]
fn tab_indented_output_snapshot() {
    let root = XmlElement::new("Items")
        .with_child(
            XmlElement::new("Item")
                .with_attribute("id", "mp_shield")
                .with_child(XmlElement::new("Flags")),
        )
        .with_child(XmlElement::new("Name").with_text("Round shield"));
    let options = WriteOptions::default().with_indent(Some(Indent::tabs()));
    let written = element_to_string(&root, options).expect("write");
    assert_eq!(
        written,
        "<Items>\n\t<Item id=\"mp_shield\">\n\t\t<Flags/>\n\t</Item>\n\t<Name>Round shield</Name>\n</Items>"
    );
}

#[test]
fn comments_are_kept_unless_disabled() {
    let xml = "<a><!-- note --><b/></a>";
    let kept = parse_str(xml).expect("parse");
    assert_eq!(kept.root.children.len(), 2);
    assert_eq!(
        element_to_string(&kept.root, WriteOptions::compact()).expect("write"),
        xml
    );

    let dropped = bme_xml::parse_str_with(xml, ReadOptions::default().with_comments(false))
        .expect("parse");
    assert_eq!(dropped.root.children.len(), 1);
}

#[test]
fn malformed_xml_reports_position() {
    let err = parse_str("<a><b></a>").unwrap_err();
    assert!(matches!(err, XmlError::Syntax { .. }));
    assert!(err.to_string().contains("malformed XML at byte"));
}

#[test]
fn files_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credits.xml");
    std::fs::write(&path, CREDITS).expect("write fixture");

    let document = read_file(&path, ReadOptions::default()).expect("read");
    let out = dir.path().join("out.xml");
    write_file(&out, &document, WriteOptions::matching(CREDITS)).expect("write");
    let reread = read_file(&out, ReadOptions::default()).expect("reread");
    assert!(structurally_equal(&document.root, &reread.root));
    assert_eq!(std::fs::read_to_string(&out).expect("read back"), CREDITS);
}

#[test]
fn missing_file_names_the_path() {
    let err = read_file(std::path::Path::new("/nonexistent/credits.xml"), ReadOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/credits.xml"));
}

#[test]
fn root_name_stops_at_the_first_start_tag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("credits.xml");
    std::fs::write(&path, CREDITS).expect("write fixture");
    assert_eq!(root_name(&path).expect("root name"), "Credits");

    let empty = dir.path().join("empty.xml");
    std::fs::write(&empty, "<?xml version=\"1.0\"?>\n<!-- nothing -->\n").expect("write fixture");
    assert!(matches!(root_name(&empty), Err(XmlError::NoRootElement)));
}
