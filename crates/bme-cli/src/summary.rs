use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bme_model::ErrorPolicy;
use bme_schema::IndexSummary;

use bme_cli::types::{CheckReport, CheckResult, SchemaListing};

/// Lines listed per file and category before the rest are elided.
const MAX_LISTED_DIFFERENCES: usize = 20;

pub fn print_check_summary(result: &CheckResult, policy: ErrorPolicy) {
    println!("Policy: {}", policy_label(policy));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Schema"),
        header_cell("Malformed"),
        header_cell("Drift"),
        header_cell("Bytes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for report in &result.reports {
        table.add_row(vec![
            Cell::new(report.path.display()),
            report
                .kind
                .map_or_else(|| dim_cell("-"), |kind| Cell::new(kind.as_str())),
            count_cell(
                (!report.failed()).then_some(report.parse_errors.len()),
                Color::Yellow,
            ),
            count_cell(
                (!report.failed()).then_some(report.differences.len()),
                Color::Red,
            ),
            bytes_cell(report),
        ]);
    }
    println!("{table}");

    for report in &result.reports {
        print_report_details(report);
    }
    println!(
        "{} file(s) checked, {} with drift, {} failed",
        result.reports.len(),
        result.drifted(),
        result.failed()
    );
}

fn print_report_details(report: &CheckReport) {
    if let Some(error) = &report.error {
        println!();
        println!("{}: {error}", report.path.display());
        return;
    }
    if !report.has_drift() && report.parse_errors.is_empty() {
        return;
    }
    println!();
    println!("{}:", report.path.display());
    print_limited("malformed", &report.parse_errors);
    print_limited("drift", &report.differences);
}

fn print_limited<T: std::fmt::Display>(label: &str, items: &[T]) {
    for item in items.iter().take(MAX_LISTED_DIFFERENCES) {
        println!("  {label}: {item}");
    }
    let hidden = items.len().saturating_sub(MAX_LISTED_DIFFERENCES);
    if hidden > 0 {
        println!("  ... and {hidden} more {label}");
    }
}

pub fn print_index_summary(summary: &IndexSummary) {
    println!(
        "{}: {} element(s) in {} chunk(s){}",
        summary.entity,
        summary.elements,
        summary.chunks,
        if summary.complete { "" } else { " (stopped early)" }
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Index"),
        header_cell("Keys"),
        header_cell("Largest bucket"),
        header_cell("Unindexed"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for index in &summary.indexes {
        let largest = index
            .buckets
            .iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map_or_else(
                || dim_cell("-"),
                |(key, count)| Cell::new(format!("{key} ({count})")),
            );
        table.add_row(vec![
            Cell::new(&index.name).add_attribute(Attribute::Bold),
            Cell::new(index.buckets.len()),
            largest,
            count_cell(Some(index.unindexed), Color::Yellow),
        ]);
    }
    println!("{table}");

    if let Some(hits) = &summary.hits {
        println!();
        if hits.is_empty() {
            println!("No matches.");
        } else {
            let mut table = Table::new();
            table.set_header(vec![header_cell("Position"), header_cell("Id")]);
            apply_table_style(&mut table);
            align_column(&mut table, 0, CellAlignment::Right);
            for hit in hits {
                table.add_row(vec![
                    Cell::new(hit.position),
                    hit.label
                        .as_deref()
                        .map_or_else(|| dim_cell("-"), Cell::new),
                ]);
            }
            println!("{table}");
        }
    }

    if !summary.diagnostics.is_clean() {
        println!();
        println!("{} malformed value(s):", summary.diagnostics.len());
        for error in summary.diagnostics.errors() {
            println!("  {error}");
        }
    }
}

pub fn print_schema_list(listings: &[SchemaListing]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Schema"),
        header_cell("Root"),
        header_cell("Entity"),
        header_cell("Indexes"),
        header_cell("Streams"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Center);
    for listing in listings {
        table.add_row(vec![
            Cell::new(listing.kind.as_str()).add_attribute(Attribute::Bold),
            Cell::new(listing.root_tag),
            listing.entity_tag.map_or_else(|| dim_cell("-"), Cell::new),
            if listing.indexes.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(listing.indexes.join(", "))
            },
            if listing.streamable {
                Cell::new("yes").fg(Color::Green)
            } else {
                dim_cell("no")
            },
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn policy_label(policy: ErrorPolicy) -> &'static str {
    match policy {
        ErrorPolicy::FailFast => "fail-fast",
        ErrorPolicy::WarnAndContinue => "warn-and-continue",
    }
}

fn bytes_cell(report: &CheckReport) -> Cell {
    match report.byte_identical() {
        Some(true) => Cell::new("identical").fg(Color::Green),
        Some(false) => Cell::new("reformatted").fg(Color::Yellow),
        None => dim_cell("-"),
    }
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
