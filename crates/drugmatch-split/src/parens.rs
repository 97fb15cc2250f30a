//! Parenthetical extraction and delimiter splitting.

use std::sync::LazyLock;

use regex::Regex;

static SYMBOL_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,/+&]\s*").expect("Invalid delimiter regex"));
static AND_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+and\s+").expect("Invalid conjunction regex"));
static WITH_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+with\s+").expect("Invalid conjunction regex"));
static AND_ANY_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").expect("Invalid conjunction regex"));

/// Removes top-level parenthesized spans from `text`.
///
/// Returns the remaining backbone with whitespace collapsed and the trimmed
/// contents of each top-level span in order of appearance. Nested parentheses
/// stay inside their enclosing span. Unmatched `)` is ignored and an unclosed
/// `(` leaves its text in the backbone.
pub fn extract_parentheticals(text: &str) -> (String, Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut backbone = chars.clone();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in chars.iter().enumerate() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let content: String = chars[start + 1..idx].iter().collect();
                    let content = content.trim();
                    if !content.is_empty() {
                        spans.push(content.to_string());
                    }
                    for slot in &mut backbone[start..=idx] {
                        *slot = ' ';
                    }
                }
            }
            _ => {}
        }
    }

    let backbone: String = backbone.into_iter().collect();
    let backbone = backbone.split_whitespace().collect::<Vec<_>>().join(" ");
    (backbone, spans)
}

/// Splits on `,` `/` `+` `&` and the lowercase conjunctions " and " and
/// " with ". Empty parts are dropped.
pub fn split_by_delimiters(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let standardized = SYMBOL_DELIMITER.replace_all(text, "|");
    let standardized = AND_DELIMITER.replace_all(&standardized, "|");
    let standardized = WITH_DELIMITER.replace_all(&standardized, "|");
    standardized
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits on " and " in any letter case.
pub(crate) fn split_on_and(text: &str) -> Vec<&str> {
    AND_ANY_CASE.split(text).collect()
}
