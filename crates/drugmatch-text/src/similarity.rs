//! Lexical similarity metrics between normalized drug names.
//!
//! Three independent metrics are exposed because none of them is reliable
//! across every failure mode:
//!
//! - Jaro-Winkler (0.0 to 1.0) rewards shared prefixes
//! - Token-set ratio (0 to 100) ignores word order and repeated tokens
//! - Levenshtein ratio (0 to 100) is order-sensitive and penalizes
//!   insertions and deletions
//!
//! All metrics are symmetric.

use std::collections::BTreeSet;

use rapidfuzz::distance::{indel, jaro_winkler as jw};

/// Jaro-Winkler similarity in `[0, 1]`.
///
/// Two empty strings are identical (1.0); an empty string against a
/// non-empty one scores 0.0.
pub fn jaro_winkler(left: &str, right: &str) -> f64 {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => jw::similarity(left.chars(), right.chars()),
    }
}

/// Jaro-Winkler similarity where a missing side scores 0.0.
pub fn jaro_winkler_optional(left: Option<&str>, right: Option<&str>) -> f64 {
    match (left, right) {
        (Some(left), Some(right)) => jaro_winkler(left, right),
        _ => 0.0,
    }
}

/// Normalized indel similarity on the raw character sequence, in `[0, 100]`.
pub fn levenshtein_ratio(left: &str, right: &str) -> f64 {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => 100.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => indel::normalized_similarity(left.chars(), right.chars()) * 100.0,
    }
}

/// Token-set ratio in `[0, 100]`.
///
/// Both inputs are treated as unordered sets of whitespace tokens. The score
/// is the best ratio between the shared tokens and each side's shared tokens
/// plus its remainder (and between the two combined forms), so reordering
/// and duplicated tokens do not penalize.
/// A strict subset sharing at least one token scores 100.
pub fn token_set_ratio(left: &str, right: &str) -> f64 {
    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();
    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = left_tokens.intersection(&right_tokens).copied().collect();
    let left_only: Vec<&str> = left_tokens.difference(&right_tokens).copied().collect();
    let right_only: Vec<&str> = right_tokens.difference(&left_tokens).copied().collect();

    if !shared.is_empty() && (left_only.is_empty() || right_only.is_empty()) {
        return 100.0;
    }

    let shared_joined = shared.join(" ");
    let left_rest = left_only.join(" ");
    let right_rest = right_only.join(" ");
    if shared_joined.is_empty() {
        return levenshtein_ratio(&left_rest, &right_rest);
    }

    let left_combined = format!("{shared_joined} {left_rest}");
    let right_combined = format!("{shared_joined} {right_rest}");
    levenshtein_ratio(&left_combined, &right_combined)
        .max(levenshtein_ratio(&shared_joined, &left_combined))
        .max(levenshtein_ratio(&shared_joined, &right_combined))
}

/// All three metrics for one pair of normalized names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScores {
    /// Jaro-Winkler similarity (0.0 to 1.0).
    pub jaro_winkler: f64,
    /// Token-set ratio (0 to 100).
    pub token_set: f64,
    /// Levenshtein ratio (0 to 100).
    pub ratio: f64,
}

impl SimilarityScores {
    /// Score a pair of normalized names with every metric.
    #[must_use]
    pub fn compute(left: &str, right: &str) -> Self {
        Self {
            jaro_winkler: jaro_winkler(left, right),
            token_set: token_set_ratio(left, right),
            ratio: levenshtein_ratio(left, right),
        }
    }
}
