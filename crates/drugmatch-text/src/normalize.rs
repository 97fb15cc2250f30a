//! Canonical text form for drug names.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalizes a drug name for comparison.
///
/// - Unicode compatibility decomposition (NFKD), accents dropped
/// - Lowercased
/// - Every character outside `[a-z0-9 ]` replaced by a space
/// - Whitespace runs collapsed, leading/trailing whitespace removed
///
/// The result is idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let mapped: String = raw
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                ch
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes an optional value; missing input yields the empty string.
pub fn normalize_optional(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Title-cases text: the first letter of every alphabetic run is uppercased,
/// the remaining letters lowercased. Non-letters are kept as-is.
///
/// ```
/// use drugmatch_text::title_case;
///
/// assert_eq!(title_case("calcium folinate"), "Calcium Folinate");
/// assert_eq!(title_case("ASPIRIN + caffeine"), "Aspirin + Caffeine");
/// ```
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_alpha = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
