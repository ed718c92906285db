use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

use anyhow::{Context, Result, bail};
use bme_ingest::{LargeDocument, should_use_streaming_with_threshold};
use bme_model::{Document, ErrorPolicy, Mapper, XmlDocument, structural_diff};
use bme_schema::class_divisions::MpClassDivision;
use bme_schema::dto::{ClassDivisionsDto, CreditsMapper};
use bme_schema::{Credits, IndexSummary, Lookup, SchemaKind};
use bme_xml::ReadOptions;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, warn};

use crate::cli::{CheckArgs, ExportArgs, IndexArgs};
use crate::config::Settings;
use crate::types::{CheckReport, CheckResult, SchemaListing};

/// Parses and rewrites every file, collecting one report per file.
///
/// A file that cannot be read or parsed is reported and the run moves on.
pub fn run_check(args: &CheckArgs, settings: &Settings) -> CheckResult {
    let settings = settings
        .clone()
        .with_policy(args.policy.map(Into::into))
        .with_chunk_size(args.chunk_size);
    let reports = args
        .files
        .iter()
        .map(|path| {
            let span = info_span!("check", path = %path.display());
            let _guard = span.enter();
            match check_file(path, &settings) {
                Ok(report) => {
                    info!(
                        differences = report.differences.len(),
                        parse_errors = report.parse_errors.len(),
                        "checked"
                    );
                    report
                }
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "check failed");
                    CheckReport::new(path.clone()).failed_with(format!("{error:#}"))
                }
            }
        })
        .collect();
    CheckResult { reports }
}

pub fn check_file(path: &Path, settings: &Settings) -> Result<CheckReport> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let source = bme_xml::parse_str_with(
        &text,
        ReadOptions::default().with_comments(settings.streaming.keep_comments),
    )
    .with_context(|| format!("parse {}", path.display()))?;
    let kind = SchemaKind::detect(&source.root.name)?;
    debug!(schema = %kind, "detected schema");

    let round_trip = kind.round_trip(
        &source.root,
        settings.policy,
        settings.streaming.chunk_size,
    )?;
    for error in round_trip.diagnostics.errors() {
        warn!(%error, "malformed value kept as written");
    }

    let rewritten = XmlDocument {
        declaration: source.declaration.clone(),
        root: round_trip.tree,
    };
    let written = bme_xml::to_string(&rewritten, settings.write_options(&text))?;

    let mut report = CheckReport::new(path.to_path_buf());
    report.kind = Some(kind);
    report.differences = structural_diff(&source.root, &rewritten.root);
    report.parse_errors = round_trip.diagnostics.errors().to_vec();
    report.source_digest = Some(bme_xml::sha256_hex(text.as_bytes()));
    report.written_digest = Some(bme_xml::sha256_hex(written.as_bytes()));
    Ok(report)
}

/// Streams an entity file into its indexes.
pub fn run_index(args: &IndexArgs, settings: &Settings) -> Result<IndexSummary> {
    let path = &args.file;
    let root = bme_xml::root_name(path).with_context(|| format!("read {}", path.display()))?;
    let kind = SchemaKind::detect(&root)?;
    if !kind.is_indexed() {
        bail!("{kind} files are not indexed collections");
    }
    let options = settings
        .clone()
        .with_chunk_size(args.chunk_size)
        .streaming;
    let lookup = match (&args.index, &args.key) {
        (Some(index), Some(key)) => Some(Lookup::new(index, key)),
        _ => None,
    };

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::no_length().with_style(
            ProgressStyle::with_template("{spinner} {msg} {pos} elements")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        )
    };
    progress.set_message(format!("indexing {}", path.display()));
    let summary = kind.index_file(path, options, lookup.as_ref(), |report| {
        progress.set_position(report.total_elements as u64);
        debug!(
            chunk = report.chunk_index,
            ingested = report.ingested,
            unindexed = report.unindexed,
            "chunk ingested"
        );
        ControlFlow::Continue(())
    })?;
    progress.finish_and_clear();

    if let Some(lookup) = &lookup
        && !summary
            .indexes
            .iter()
            .any(|index| index.name == lookup.index)
    {
        bail!(
            "{} has no index named {}; available: {}",
            summary.entity,
            lookup.index,
            summary
                .indexes
                .iter()
                .map(|index| index.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    info!(
        schema = %kind,
        elements = summary.elements,
        chunks = summary.chunks,
        "indexed"
    );
    Ok(summary)
}

/// Maps a credits or class division file to its transfer object as JSON.
pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<String> {
    let path = &args.file;
    let root = bme_xml::root_name(path).with_context(|| format!("read {}", path.display()))?;
    let kind = SchemaKind::detect(&root)?;
    let json = match kind {
        SchemaKind::Credits => {
            let source = bme_xml::read_file(path, ReadOptions::default())?;
            let document = Document::<Credits>::parse(&source.root, settings.policy)?;
            let credits = document.into_root().unwrap_or_default();
            to_json(&CreditsMapper::to_dto(&credits), args.pretty)?
        }
        SchemaKind::ClassDivisions => {
            let document = load_divisions(path, settings)?;
            document.diagnostics.check(settings.policy)?;
            let dto = ClassDivisionsDto::from_divisions(document.collection.elements());
            to_json(&dto, args.pretty)?
        }
        other => bail!("{other} files have no transfer object to export"),
    };

    if let Some(output) = &args.output {
        fs::write(output, &json).with_context(|| format!("write {}", output.display()))?;
        info!(path = %output.display(), bytes = json.len(), "export written");
    }
    Ok(json)
}

/// Every schema `bme` knows, in detection order.
pub fn run_list() -> Vec<SchemaListing> {
    SchemaKind::ALL.into_iter().map(SchemaListing::from).collect()
}

fn load_divisions(path: &Path, settings: &Settings) -> Result<LargeDocument<MpClassDivision>> {
    let options = settings.streaming.clone();
    if should_use_streaming_with_threshold(path, options.threshold_bytes) {
        debug!(path = %path.display(), "streaming class divisions");
        return Ok(LargeDocument::load(path, options)?);
    }
    let source = bme_xml::read_file(
        path,
        ReadOptions::default().with_comments(options.keep_comments),
    )?;
    Ok(LargeDocument::from_element(&source.root, options.chunk_size)?)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// The policy that `check` applies, for the report header.
pub fn effective_policy(args: &CheckArgs, settings: &Settings) -> ErrorPolicy {
    args.policy.map_or(settings.policy, Into::into)
}
