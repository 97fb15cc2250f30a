//! Summary tables printed after `match`, `sweep` and `synonym-check`.

use std::collections::{BTreeSet, HashSet};

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use drugmatch_map::{SweepRow, SynonymCoverage};
use drugmatch_model::{DrugRecord, MatchResult, MatchType};
use drugmatch_text::normalize;

/// Counts describing one matching run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub source_records: usize,
    pub reference_records: usize,
    pub matches: usize,
    pub exact_identifier: usize,
    pub fuzzy: usize,
    pub matched_sources: usize,
    pub unmatched_sources: usize,
    pub matched_targets: usize,
    pub combination_components: usize,
}

impl MatchSummary {
    pub fn new(sources: &[DrugRecord], targets: &[DrugRecord], results: &[MatchResult]) -> Self {
        let matched: HashSet<String> = results.iter().map(|r| normalize(&r.source_name)).collect();
        let distinct_sources: HashSet<&str> = sources
            .iter()
            .filter(|r| r.has_name())
            .map(|r| r.normalized_name.as_str())
            .collect();
        let matched_targets: HashSet<&str> =
            results.iter().map(|r| r.target_name.as_str()).collect();
        let exact_identifier = results
            .iter()
            .filter(|r| r.match_type == MatchType::ExactIdentifier)
            .count();

        Self {
            source_records: sources.len(),
            reference_records: targets.len(),
            matches: results.len(),
            exact_identifier,
            fuzzy: results.len() - exact_identifier,
            matched_sources: matched.len(),
            unmatched_sources: distinct_sources
                .iter()
                .filter(|name| !matched.contains(**name))
                .count(),
            matched_targets: matched_targets.len(),
            combination_components: results.iter().filter(|r| r.is_combination).count(),
        }
    }
}

/// Source names, first spelling per normalized name, that appear in no result.
pub fn unmatched_names(sources: &[DrugRecord], results: &[MatchResult]) -> Vec<String> {
    let matched: HashSet<String> = results.iter().map(|r| normalize(&r.source_name)).collect();
    let mut seen = BTreeSet::new();
    sources
        .iter()
        .filter(|r| r.has_name() && !matched.contains(&r.normalized_name))
        .filter(|r| seen.insert(r.normalized_name.clone()))
        .map(|r| r.name.clone())
        .collect()
}

pub fn match_table(summary: &MatchSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    let rows = [
        ("Source records", summary.source_records),
        ("Reference records", summary.reference_records),
        ("Exact identifier matches", summary.exact_identifier),
        ("Fuzzy matches", summary.fuzzy),
        ("Matched source names", summary.matched_sources),
        ("Unmatched source names", summary.unmatched_sources),
        ("Matched reference names", summary.matched_targets),
        ("Combination components matched", summary.combination_components),
    ];
    for (label, count) in rows {
        table.add_row(vec![Cell::new(label), count_cell(count, Color::Green)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.matches).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn print_match_summary(summary: &MatchSummary) {
    println!("{}", match_table(summary));
}

pub fn sweep_table(rows: &[SweepRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Jaro-Winkler"),
        header_cell("Jaccard"),
        header_cell("Matches"),
        header_cell("Unique sources"),
        header_cell("Unique targets"),
    ]);
    apply_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let best = rows.iter().map(|row| row.total_matches).max().unwrap_or(0);
    for row in rows {
        let matches = if row.total_matches == best && best > 0 {
            Cell::new(row.total_matches)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            count_cell(row.total_matches, Color::Reset)
        };
        table.add_row(vec![
            Cell::new(format!("{:.2}", row.jaro_winkler)),
            Cell::new(format!("{:.2}", row.jaccard)),
            matches,
            Cell::new(row.unique_sources),
            Cell::new(row.unique_targets),
        ]);
    }
    table
}

pub fn print_sweep_summary(rows: &[SweepRow]) {
    println!("{}", sweep_table(rows));
}

/// One row per rewritten name with its outcome.
pub fn coverage_table(coverage: &SynonymCoverage) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rewritten name"), header_cell("Outcome")]);
    apply_table_style(&mut table);

    for name in &coverage.matched {
        table.add_row(vec![Cell::new(name), Cell::new("matched").fg(Color::Green)]);
    }
    for name in &coverage.unmatched {
        table.add_row(vec![Cell::new(name), Cell::new("unmatched").fg(Color::Yellow)]);
    }
    table
}

pub fn print_coverage_summary(coverage: &SynonymCoverage) {
    println!("Synonym entries: {}", coverage.entries);
    println!("Names matched after synonyms: {}", coverage.matched.len());
    println!("Names still unmatched: {}", coverage.unmatched.len());
    if coverage.rewritten() > 0 {
        println!("{}", coverage_table(coverage));
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}
