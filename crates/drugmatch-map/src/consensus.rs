//! Two-of-three metric voting.

use std::collections::BTreeSet;

use drugmatch_model::MatchThresholds;
use drugmatch_text::{SimilarityScores, jaccard_sets};

/// True when at least two of the three metrics reach their threshold.
///
/// Reaching a threshold exactly counts as passing.
pub fn is_high_confidence(
    jaro_winkler: f64,
    token_set: f64,
    ratio: f64,
    jaro_winkler_threshold: f64,
    token_set_threshold: f64,
    ratio_threshold: f64,
) -> bool {
    let votes = [
        jaro_winkler >= jaro_winkler_threshold,
        token_set >= token_set_threshold,
        ratio >= ratio_threshold,
    ];
    votes.iter().filter(|passed| **passed).count() >= 2
}

/// Decides whether two normalized names refer to the same drug.
#[derive(Debug, Clone, Copy)]
pub struct ConsensusMatcher {
    thresholds: MatchThresholds,
}

impl ConsensusMatcher {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        &self.thresholds
    }

    /// Coarse token-overlap gate applied before full scoring.
    pub fn passes_filter(&self, left: &BTreeSet<String>, right: &BTreeSet<String>) -> bool {
        jaccard_sets(left, right) >= self.thresholds.jaccard
    }

    pub fn accepts(&self, scores: &SimilarityScores) -> bool {
        is_high_confidence(
            scores.jaro_winkler,
            scores.token_set,
            scores.ratio,
            self.thresholds.jaro_winkler,
            self.thresholds.token_set,
            self.thresholds.ratio,
        )
    }
}

impl Default for ConsensusMatcher {
    fn default() -> Self {
        Self::new(MatchThresholds::default())
    }
}
