//! Match coverage across a grid of threshold settings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info_span;

use drugmatch_model::{DrugRecord, MatchThresholds};

use crate::resolver::IdentityResolver;
use crate::synonyms::SynonymMap;

pub const DEFAULT_JARO_WINKLER_GRID: [f64; 5] = [0.70, 0.80, 0.85, 0.90, 0.95];
pub const DEFAULT_JACCARD_GRID: [f64; 3] = [0.10, 0.30, 0.50];

/// Thresholds varied by a sweep. Token-set and ratio thresholds stay at the
/// base values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub jaro_winkler: Vec<f64>,
    pub jaccard: Vec<f64>,
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            jaro_winkler: DEFAULT_JARO_WINKLER_GRID.to_vec(),
            jaccard: DEFAULT_JACCARD_GRID.to_vec(),
        }
    }
}

/// Outcome of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub jaro_winkler: f64,
    pub jaccard: f64,
    pub total_matches: usize,
    pub unique_sources: usize,
    pub unique_targets: usize,
}

/// Runs resolution once per (Jaro-Winkler, Jaccard) pair, Jaro-Winkler major.
pub fn sweep(
    sources: &[DrugRecord],
    targets: &[DrugRecord],
    base: MatchThresholds,
    grid: &SweepGrid,
    synonyms: &SynonymMap,
) -> Vec<SweepRow> {
    let mut rows = Vec::with_capacity(grid.jaro_winkler.len() * grid.jaccard.len());
    for &jaro_winkler in &grid.jaro_winkler {
        for &jaccard in &grid.jaccard {
            let _span = info_span!("sweep", jaro_winkler, jaccard).entered();
            let thresholds = base.with_jaro_winkler(jaro_winkler).with_jaccard(jaccard);
            let results = IdentityResolver::new(thresholds, synonyms).resolve(sources, targets);
            let unique_sources: HashSet<&str> =
                results.iter().map(|r| r.source_name.as_str()).collect();
            let unique_targets: HashSet<&str> =
                results.iter().map(|r| r.target_name.as_str()).collect();
            rows.push(SweepRow {
                jaro_winkler,
                jaccard,
                total_matches: results.len(),
                unique_sources: unique_sources.len(),
                unique_targets: unique_targets.len(),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_fifteen_cells_in_order() {
        let sources = vec![
            DrugRecord::new("Amoxicillin Trihydrate"),
            DrugRecord::new("Aspirin"),
        ];
        let targets = vec![DrugRecord::new("Amoxicillin"), DrugRecord::new("Aspirin")];
        let rows = sweep(
            &sources,
            &targets,
            MatchThresholds::default(),
            &SweepGrid::default(),
            &SynonymMap::default(),
        );
        assert_eq!(rows.len(), 15);
        assert_eq!((rows[0].jaro_winkler, rows[0].jaccard), (0.70, 0.10));
        assert_eq!((rows[1].jaro_winkler, rows[1].jaccard), (0.70, 0.30));
        assert_eq!((rows[14].jaro_winkler, rows[14].jaccard), (0.95, 0.50));
        assert_eq!(rows[0].total_matches, 2);
    }

    #[test]
    fn stricter_jaccard_never_adds_matches() {
        let sources = vec![DrugRecord::new("Amoxycillin"), DrugRecord::new("Metformin Hcl")];
        let targets = vec![DrugRecord::new("Amoxicillin"), DrugRecord::new("Metformin")];
        let rows = sweep(
            &sources,
            &targets,
            MatchThresholds::default(),
            &SweepGrid {
                jaro_winkler: vec![0.85],
                jaccard: vec![0.0, 0.5],
            },
            &SynonymMap::default(),
        );
        assert!(rows[1].total_matches <= rows[0].total_matches);
    }
}
