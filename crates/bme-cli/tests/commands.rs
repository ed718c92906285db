//! Integration tests for the `check`, `index`, `export` and `list` commands.

use std::fs;
use std::path::{Path, PathBuf};

use bme_cli::cli::{CheckArgs, ExportArgs, IndexArgs, PolicyArg};
use bme_cli::commands::{check_file, run_check, run_export, run_index, run_list};
use bme_cli::config::{FileConfig, Settings};
use bme_schema::SchemaKind;

const CREDITS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Credits>
  <Category Text="Developers">
    <Section Text="Design"/>
    <Entry Text="Alice"/>
    <EmptyLine/>
    <Entry Text="Bob"/>
  </Category>
  <LoadFromFile Name="CreditsExtra" PlatformSpecific="true"/>
</Credits>
"#;

const DIVISIONS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MPClassDivisions>
  <MPClassDivision id="mp_heavy_infantry_vlandia_troop" cost="120"/>
  <MPClassDivision id="mp_light_infantry_empire_troop" cost="90">
    <Perks>
      <Perk game_mode="skirmish" name="{=!}Sprint"/>
    </Perks>
  </MPClassDivision>
  <MPClassDivision id="mp_horse_archer_khuzait_troop" cost="140"/>
</MPClassDivisions>
"#;

fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn check_args(files: Vec<PathBuf>, policy: Option<PolicyArg>) -> CheckArgs {
    CheckArgs {
        files,
        policy,
        chunk_size: None,
    }
}

fn index_args(file: PathBuf, lookup: Option<(&str, &str)>) -> IndexArgs {
    IndexArgs {
        file,
        chunk_size: Some(2),
        index: lookup.map(|(index, _)| index.to_string()),
        key: lookup.map(|(_, key)| key.to_string()),
        no_progress: true,
    }
}

#[test]
fn check_reports_no_drift_for_known_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let credits = write_fixture(dir.path(), "Credits.xml", CREDITS);
    let divisions = write_fixture(dir.path(), "mpclassdivisions.xml", DIVISIONS);

    let result = run_check(&check_args(vec![credits, divisions], None), &Settings::default());

    assert_eq!(result.reports.len(), 2);
    assert!(!result.has_errors());
    assert_eq!(result.reports[0].kind, Some(SchemaKind::Credits));
    assert_eq!(result.reports[1].kind, Some(SchemaKind::ClassDivisions));
    for report in &result.reports {
        assert!(report.differences.is_empty(), "{:?}", report.differences);
        assert!(report.byte_identical().is_some());
    }
}

#[test]
fn check_continues_past_files_it_cannot_handle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let unknown = write_fixture(dir.path(), "Kingdoms.xml", "<Kingdoms/>");
    let broken = write_fixture(dir.path(), "broken.xml", "<Credits><Category></Credits>");
    let credits = write_fixture(dir.path(), "Credits.xml", CREDITS);
    let missing = dir.path().join("missing.xml");

    let result = run_check(
        &check_args(vec![unknown, broken, missing, credits], None),
        &Settings::default(),
    );

    assert_eq!(result.failed(), 3);
    assert!(result.has_errors());
    let unknown_error = result.reports[0].error.as_deref().expect("unknown root");
    assert!(unknown_error.contains("no schema for root element <Kingdoms>"));
    assert!(
        result.reports[2]
            .error
            .as_deref()
            .is_some_and(|error| error.starts_with("read "))
    );
    assert!(!result.reports[3].failed());
}

#[test]
fn policy_flag_overrides_the_configured_policy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(
        dir.path(),
        "Credits.xml",
        r#"<Credits><LoadFromFile Name="x" PlatformSpecific="maybe"/></Credits>"#,
    );
    let lenient = Settings::from_config(
        &FileConfig::parse("policy = \"warn-and-continue\"").expect("parse"),
    );

    let kept = check_file(&path, &lenient).expect("warn and continue");
    assert_eq!(kept.parse_errors.len(), 1);
    assert_eq!(kept.parse_errors[0].raw_value, "maybe");
    assert!(kept.differences.is_empty());

    let result = run_check(&check_args(vec![path], Some(PolicyArg::FailFast)), &lenient);
    assert_eq!(result.failed(), 1);
}

#[test]
fn index_summarizes_buckets_and_lookup_hits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "mpclassdivisions.xml", DIVISIONS);

    let summary = run_index(
        &index_args(path, Some(("by_culture", "infantry"))),
        &Settings::default(),
    )
    .expect("index");

    assert_eq!(summary.entity, "MPClassDivision");
    assert_eq!(summary.elements, 3);
    assert_eq!(summary.chunks, 2);
    assert!(summary.complete);
    assert_eq!(summary.hits.map(|hits| hits.len()), Some(2));
}

#[test]
fn index_rejects_unknown_index_names_and_plain_documents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let divisions = write_fixture(dir.path(), "mpclassdivisions.xml", DIVISIONS);
    let credits = write_fixture(dir.path(), "Credits.xml", CREDITS);

    let error = run_index(
        &index_args(divisions, Some(("by_colour", "red"))),
        &Settings::default(),
    )
    .expect_err("unknown index");
    assert!(error.to_string().contains("no index named by_colour"));

    let error = run_index(&index_args(credits, None), &Settings::default())
        .expect_err("credits are not indexed");
    assert!(error.to_string().contains("credits files are not indexed"));
}

#[test]
fn export_writes_credits_transfer_object() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "Credits.xml", CREDITS);
    let output = dir.path().join("credits.json");

    let json = run_export(
        &ExportArgs {
            file: path,
            pretty: false,
            output: Some(output.clone()),
        },
        &Settings::default(),
    )
    .expect("export");

    insta::assert_snapshot!(json, @r#"{"items":[{"kind":"category","text":"Developers","items":[{"kind":"section","text":"Design","items":[]},{"kind":"entry","text":"Alice"},{"kind":"empty_line"},{"kind":"entry","text":"Bob"}]},{"kind":"load_from_file","name":"CreditsExtra","platform_specific":"true","console_specific":null}]}"#);
    assert_eq!(fs::read_to_string(output).expect("read output"), json);
}

#[test]
fn export_class_divisions_streams_above_the_threshold() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "mpclassdivisions.xml", DIVISIONS);
    let args = ExportArgs {
        file: path,
        pretty: true,
        output: None,
    };

    let parsed = run_export(&args, &Settings::default()).expect("export parsed");
    let streaming = Settings::from_config(
        &FileConfig::parse("[streaming]\nthreshold_bytes = 1\nchunk_size = 1\n").expect("parse"),
    );
    let streamed = run_export(&args, &streaming).expect("export streamed");

    assert_eq!(parsed, streamed);
    let value: serde_json::Value = serde_json::from_str(&parsed).expect("valid json");
    let divisions = value["divisions"].as_array().expect("divisions array");
    assert_eq!(divisions.len(), 3);
    assert_eq!(divisions[1]["id"], "mp_light_infantry_empire_troop");
}

#[test]
fn export_rejects_files_without_transfer_objects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_fixture(dir.path(), "items.xml", "<Items/>");
    let error = run_export(
        &ExportArgs {
            file: path,
            pretty: false,
            output: None,
        },
        &Settings::default(),
    )
    .expect_err("items have no dto");
    assert_eq!(
        error.to_string(),
        "items files have no transfer object to export"
    );
}

#[test]
fn list_covers_every_schema_with_its_indexes() {
    let listings = run_list();
    assert_eq!(listings.len(), SchemaKind::ALL.len());

    let divisions = listings
        .iter()
        .find(|listing| listing.kind == SchemaKind::ClassDivisions)
        .expect("class divisions listed");
    assert_eq!(divisions.root_tag, "MPClassDivisions");
    assert_eq!(divisions.entity_tag, Some("MPClassDivision"));
    assert_eq!(divisions.indexes, ["by_culture", "by_game_mode"]);
    assert!(divisions.streamable);

    let prerender = listings
        .iter()
        .find(|listing| listing.kind == SchemaKind::Prerender)
        .expect("prerender listed");
    assert_eq!(prerender.entity_tag, Some("postfx_graph"));
    assert!(!prerender.streamable);

    let credits = &listings[0];
    assert_eq!(credits.kind, SchemaKind::Credits);
    assert_eq!(credits.entity_tag, None);
    assert!(credits.indexes.is_empty());
}
