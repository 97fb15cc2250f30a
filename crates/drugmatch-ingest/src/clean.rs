//! Record cleaning: dosage-form stripping, text and date normalization.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use drugmatch_model::DrugRecord;
use drugmatch_text::title_case;

/// Dosage forms, routes and units. The first hit and everything after it is
/// dropped from a product name.
static FORM_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(tablet|capsule|injection|cream|ointment|spray|solution|gel|drops?|suspension|eye|ear|nasal|intranasal|oral|iv|im|vial|ampoule|sachet|mg|mcg|g|%|w/v|w/w|v/v)\b.*",
    )
    .expect("Invalid form suffix regex")
});

static STRENGTH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\d.,]+(mg|mcg|g|%)+.*").expect("Invalid strength suffix regex")
});

static ORPHAN_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)yes|designat|approved|^\s*(true|1)\s*$").expect("Invalid orphan flag regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static YEAR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})$").expect("Invalid year regex"));

static MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").expect("Invalid month/year regex"));

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$").expect("Invalid ISO date regex")
});

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b").expect("Invalid day-first date regex")
});

/// Unicode-decomposes, collapses whitespace and trims. Missing text becomes
/// an empty string.
pub fn normalize_text(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let decomposed: String = raw.nfkd().collect();
    WHITESPACE.replace_all(&decomposed, " ").trim().to_string()
}

/// Reads an orphan designation cell. Values such as "Yes", "Designated" or
/// "Orphan approved" are designated, as are the `true`/`1` flags this crate
/// writes; anything else is not.
pub fn parse_orphan_flag(raw: &str) -> bool {
    ORPHAN_FLAG.is_match(raw)
}

/// Removes dosage forms and strengths from a product name and title-cases
/// what remains.
///
/// ```
/// use drugmatch_ingest::strip_forms;
///
/// assert_eq!(strip_forms("Paracetamol 500mg Tablet"), "Paracetamol");
/// assert_eq!(strip_forms("Cough Syrup"), "Cough Syrup");
/// ```
pub fn strip_forms(name: &str) -> String {
    let text = normalize_text(Some(name));
    let text = FORM_SUFFIX.replace(&text, "");
    let text = STRENGTH_SUFFIX.replace(&text, "");
    title_case(text.trim_matches([',', ';', '-', ' ']))
}

/// Normalizes an approval date to `MM/DD/YYYY`.
///
/// Accepts a bare year, `MM/YYYY`, ISO `YYYY-MM-DD`, and day-first dates
/// separated by `/`, `-` or `.` with two- or four-digit years. Two-digit
/// years above 30 are 19xx. Returns `None` for anything that is not a real
/// calendar date.
pub fn normalize_date(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = YEAR_ONLY.captures(text) {
        return format_date(caps[1].parse().ok()?, 1, 1);
    }
    if let Some(caps) = MONTH_YEAR.captures(text) {
        return format_date(caps[2].parse().ok()?, caps[1].parse().ok()?, 1);
    }
    if let Some(caps) = ISO_DATE.captures(text) {
        return format_date(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    let unified = text.replace(['.', '-'], "/");
    let caps = DAY_FIRST.captures(&unified)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year_text = &caps[3];
    let mut year: i32 = year_text.parse().ok()?;
    if year_text.len() == 2 {
        year += if year > 30 { 1900 } else { 2000 };
    }
    format_date(year, month, day)
}

fn format_date(year: i32, month: u32, day: u32) -> Option<String> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%m/%d/%Y").to_string())
}

/// Counters gathered by [`clean_records`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub input: usize,
    pub output: usize,
    pub missing_indication: usize,
    pub missing_date: usize,
    pub duplicates: usize,
    pub orphan: usize,
}

/// Cleans names, dates and indications, then drops records whose cleaned
/// name repeats an earlier one.
pub fn clean_records(records: Vec<DrugRecord>) -> (Vec<DrugRecord>, CleanReport) {
    let mut report = CleanReport {
        input: records.len(),
        ..CleanReport::default()
    };
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(records.len());

    for record in records {
        let name = strip_forms(&record.name);
        if !seen.insert(name.clone()) {
            debug!(name = %name, "dropping duplicate record");
            report.duplicates += 1;
            continue;
        }
        let date = record.approval_date.as_deref().and_then(normalize_date);
        let indication = normalize_text(record.indication.as_deref());
        if date.is_none() {
            report.missing_date += 1;
        }
        if indication.is_empty() {
            report.missing_indication += 1;
        }
        if record.orphan == Some(true) {
            report.orphan += 1;
        }

        let mut next = DrugRecord::new(name)
            .approval_date(date)
            .indication(Some(indication))
            .orphan(record.orphan)
            .with_identifier(record.identifier);
        next.original_name = record.original_name;
        next.is_combination = record.is_combination;
        cleaned.push(next);
    }

    report.output = cleaned.len();
    if report.missing_indication > 0 {
        info!(
            rows = report.missing_indication,
            "rows missing indication left blank"
        );
    }
    if report.missing_date > 0 {
        info!(rows = report.missing_date, "rows without a usable approval date");
    }
    info!(
        input = report.input,
        output = report.output,
        duplicates = report.duplicates,
        orphan = report.orphan,
        "cleaned records"
    );
    (cleaned, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_forms() {
        assert_eq!(strip_forms("Paracetamol 500mg Tablet"), "Paracetamol");
        assert_eq!(strip_forms("Aspirin 100mg"), "Aspirin");
        assert_eq!(strip_forms("ibuprofen  oral suspension"), "Ibuprofen");
        assert_eq!(strip_forms("Povidone Iodine 5% w/v"), "Povidone Iodine");
        assert_eq!(strip_forms("Cough Syrup"), "Cough Syrup");
        assert_eq!(strip_forms("  "), "");
    }

    #[test]
    fn test_parse_orphan_flag() {
        assert!(parse_orphan_flag("Yes"));
        assert!(parse_orphan_flag("Orphan Designated"));
        assert!(parse_orphan_flag("APPROVED"));
        assert!(parse_orphan_flag("true"));
        assert!(parse_orphan_flag("1"));
        assert!(!parse_orphan_flag("No"));
        assert!(!parse_orphan_flag("false"));
        assert!(!parse_orphan_flag("0"));
        assert!(!parse_orphan_flag("10"));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(Some("  Pain \t and\nfever ")), "Pain and fever");
        assert_eq!(normalize_text(None), "");
    }

    #[test]
    fn test_normalize_date_partial() {
        assert_eq!(normalize_date("2019").as_deref(), Some("01/01/2019"));
        assert_eq!(normalize_date("03/2019").as_deref(), Some("03/01/2019"));
        assert_eq!(normalize_date("13/2019"), None);
    }

    #[test]
    fn test_normalize_date_day_first() {
        assert_eq!(normalize_date("25/12/2020").as_deref(), Some("12/25/2020"));
        assert_eq!(normalize_date("5-6-99").as_deref(), Some("06/05/1999"));
        assert_eq!(normalize_date("5.6.21").as_deref(), Some("06/05/2021"));
        assert_eq!(normalize_date("2020-12-25").as_deref(), Some("12/25/2020"));
    }

    #[test]
    fn test_normalize_date_rejects_invalid() {
        assert_eq!(normalize_date("31/02/2020"), None);
        assert_eq!(normalize_date("1/2/345"), None);
        assert_eq!(normalize_date("not a date"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn test_clean_records_dedups_and_counts() {
        let records = vec![
            DrugRecord::new("Aspirin 100mg Tablet")
                .approval_date(Some("01/02/2003".to_string()))
                .indication(Some("Pain".to_string())),
            DrugRecord::new("ASPIRIN"),
            DrugRecord::new("Metformin")
                .approval_date(Some("unknown".to_string()))
                .orphan(Some(true)),
        ];
        let (cleaned, report) = clean_records(records);

        let names: Vec<&str> = cleaned.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Aspirin", "Metformin"]);
        assert_eq!(cleaned[0].approval_date.as_deref(), Some("02/01/2003"));
        assert_eq!(cleaned[1].orphan, Some(true));
        assert_eq!(
            report,
            CleanReport {
                input: 3,
                output: 2,
                missing_indication: 1,
                missing_date: 1,
                duplicates: 1,
                orphan: 1,
            }
        );
    }
}
