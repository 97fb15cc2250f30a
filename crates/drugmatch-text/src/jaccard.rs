//! Coarse token-overlap score used to shortlist match candidates.

use std::collections::BTreeSet;

use crate::normalize::normalize;

/// Whitespace-delimited token set of the normalized text.
pub fn token_set(raw: &str) -> BTreeSet<String> {
    normalize(raw)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the two token sets with a one-element sentinel in
/// the union: `|A ∩ B| / |A ∪ B ∪ {" "}|`.
///
/// The sentinel can never be produced by tokenization, so the union is
/// always one larger than the plain union and never zero. Two empty inputs
/// score 0.0 and identical inputs stay strictly below 1.0.
pub fn jaccard(left: &str, right: &str) -> f64 {
    jaccard_sets(&token_set(left), &token_set(right))
}

/// [`jaccard`] over token sets that were already built with [`token_set`].
pub fn jaccard_sets(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let shared = left.intersection(right).count();
    let union = left.union(right).count() + 1;
    shared as f64 / union as f64
}
