//! Source-to-reference identity resolution.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, trace};

use drugmatch_model::{DrugRecord, MatchResult, MatchThresholds};
use drugmatch_text::{SimilarityScores, token_set};

use crate::consensus::ConsensusMatcher;
use crate::synonyms::SynonymMap;

/// Reference record prepared for repeated fuzzy comparison.
#[derive(Debug, Clone)]
pub struct PreparedTarget<'a> {
    pub record: &'a DrugRecord,
    tokens: BTreeSet<String>,
}

impl<'a> PreparedTarget<'a> {
    pub fn new(record: &'a DrugRecord) -> Self {
        Self {
            record,
            tokens: token_set(&record.normalized_name),
        }
    }
}

/// Links source records to reference records.
///
/// Resolution runs in two passes. Records sharing an external identifier
/// are paired first with a score of 1.0. The remaining source records are
/// compared against every reference record by name; a pair is kept when it
/// passes the Jaccard filter and the consensus vote. Finally only the best
/// result per source name survives.
#[derive(Debug, Clone)]
pub struct IdentityResolver<'s> {
    matcher: ConsensusMatcher,
    synonyms: &'s SynonymMap,
}

impl<'s> IdentityResolver<'s> {
    pub fn new(thresholds: MatchThresholds, synonyms: &'s SynonymMap) -> Self {
        Self {
            matcher: ConsensusMatcher::new(thresholds),
            synonyms,
        }
    }

    pub fn thresholds(&self) -> &MatchThresholds {
        self.matcher.thresholds()
    }

    /// Full resolution of `sources` against `targets`.
    ///
    /// The output holds at most one result per source name, sorted by
    /// descending score. Ties keep input order with identifier matches first.
    pub fn resolve(&self, sources: &[DrugRecord], targets: &[DrugRecord]) -> Vec<MatchResult> {
        let (mut results, matched) = exact_identifier_matches(sources, targets);
        info!(
            identifier_matches = results.len(),
            matched_sources = matched.len(),
            "identifier pass complete"
        );

        let pool: Vec<&DrugRecord> = sources
            .iter()
            .enumerate()
            .filter(|(idx, _)| !matched.contains(idx))
            .map(|(_, record)| record)
            .collect();
        let pool = dedup_by_name(pool);
        let prepared: Vec<PreparedTarget<'_>> = dedup_by_name(targets.iter().collect())
            .into_iter()
            .map(PreparedTarget::new)
            .collect();
        debug!(
            sources = pool.len(),
            targets = prepared.len(),
            "fuzzy pass candidates"
        );

        let before = results.len();
        for source in pool {
            results.extend(self.resolve_source(source, &prepared));
        }
        info!(
            fuzzy_matches = results.len() - before,
            "fuzzy pass complete"
        );

        let best = best_per_source(results);
        info!(matches = best.len(), "resolution complete");
        best
    }

    /// Every accepted fuzzy pair for one source record, in target order.
    ///
    /// The source name is substituted through the synonym map before
    /// scoring. Independent per source, so callers may shard sources.
    pub fn resolve_source(
        &self,
        source: &DrugRecord,
        targets: &[PreparedTarget<'_>],
    ) -> Vec<MatchResult> {
        let name = self.synonyms.apply(&source.normalized_name);
        if name.is_empty() {
            return Vec::new();
        }
        let tokens = token_set(name);

        targets
            .iter()
            .filter(|target| self.matcher.passes_filter(&tokens, &target.tokens))
            .filter_map(|target| {
                let candidate = target.record.normalized_name.as_str();
                let scores = SimilarityScores::compute(name, candidate);
                let accepted = self.matcher.accepts(&scores);
                trace!(
                    source = name,
                    candidate,
                    jw = scores.jaro_winkler,
                    tsr = scores.token_set,
                    lev = scores.ratio,
                    accepted,
                    "scored pair"
                );
                if !accepted {
                    return None;
                }
                Some(MatchResult::fuzzy(
                    source,
                    target.record,
                    scores.jaro_winkler,
                    scores.token_set,
                    scores.ratio,
                ))
            })
            .collect()
    }
}

/// Pairs records sharing a non-empty identifier.
///
/// Many-to-many: every source is paired with every target carrying its
/// identifier. Also returns the indices of matched source records.
pub fn exact_identifier_matches(
    sources: &[DrugRecord],
    targets: &[DrugRecord],
) -> (Vec<MatchResult>, HashSet<usize>) {
    let mut by_identifier: BTreeMap<&str, Vec<&DrugRecord>> = BTreeMap::new();
    for target in targets {
        if let Some(id) = target.identifier.as_deref().filter(|id| !id.is_empty()) {
            by_identifier.entry(id).or_default().push(target);
        }
    }

    let mut results = Vec::new();
    let mut matched = HashSet::new();
    for (idx, source) in sources.iter().enumerate() {
        let Some(id) = source.identifier.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        if let Some(found) = by_identifier.get(id) {
            matched.insert(idx);
            results.extend(
                found
                    .iter()
                    .map(|target| MatchResult::exact_identifier(source, target)),
            );
        }
    }
    (results, matched)
}

/// Drops records with an empty normalized name and later duplicates of a
/// normalized name.
pub fn dedup_by_name(records: Vec<&DrugRecord>) -> Vec<&DrugRecord> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if record.has_name() && seen.insert(record.normalized_name.as_str()) {
            kept.push(record);
        }
    }
    kept
}

/// Keeps the highest-scoring result per source name.
///
/// The sort is stable, so among equal scores the earlier result wins.
pub fn best_per_source(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(Ordering::Equal)
    });
    let mut seen = HashSet::new();
    results.retain(|result| seen.insert(result.source_name.clone()));
    results
}

#[cfg(test)]
mod tests {
    use drugmatch_model::MatchType;

    use super::*;

    fn record(name: &str, id: Option<&str>) -> DrugRecord {
        DrugRecord::new(name).with_identifier(id.map(str::to_string))
    }

    #[test]
    fn best_per_source_keeps_highest_score() {
        let source = DrugRecord::new("Amoxycilin");
        let low = MatchResult::fuzzy(&source, &DrugRecord::new("Amoxapine"), 0.87, 90.0, 90.0);
        let high = MatchResult::fuzzy(&source, &DrugRecord::new("Amoxicillin"), 0.92, 90.0, 90.0);
        let best = best_per_source(vec![low, high]);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].target_name, "Amoxicillin");
        assert_eq!(best[0].similarity_score, 0.92);
    }

    #[test]
    fn ties_keep_first_result() {
        let source = DrugRecord::new("Aspirin");
        let first = MatchResult::fuzzy(&source, &DrugRecord::new("Aspirin A"), 0.9, 90.0, 90.0);
        let second = MatchResult::fuzzy(&source, &DrugRecord::new("Aspirin B"), 0.9, 90.0, 90.0);
        let best = best_per_source(vec![first, second]);
        assert_eq!(best[0].target_name, "Aspirin A");
    }

    #[test]
    fn identifier_join_is_many_to_many() {
        let sources = vec![record("Tylenol", Some("161")), record("Unknown", None)];
        let targets = vec![
            record("Acetaminophen", Some("161")),
            record("Paracetamol", Some("161")),
            record("Other", Some("")),
        ];
        let (results, matched) = exact_identifier_matches(&sources, &targets);
        assert_eq!(results.len(), 2);
        assert!(matched.contains(&0));
        assert!(!matched.contains(&1));
        assert!(results
            .iter()
            .all(|r| r.match_type == MatchType::ExactIdentifier && r.similarity_score == 1.0));
    }

    #[test]
    fn dedup_keeps_first_and_drops_empty() {
        let records = [
            DrugRecord::new("Aspirin").indication(Some("first".to_string())),
            DrugRecord::new("ASPIRIN").indication(Some("second".to_string())),
            DrugRecord::new("***"),
        ];
        let kept = dedup_by_name(records.iter().collect());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].indication.as_deref(), Some("first"));
    }

    #[test]
    fn synonyms_apply_before_scoring() {
        let synonyms = SynonymMap::from_pairs([("tylenol", "acetaminophen")]);
        let resolver = IdentityResolver::new(MatchThresholds::default(), &synonyms);
        let target = DrugRecord::new("Acetaminophen");
        let prepared = [PreparedTarget::new(&target)];
        let results = resolver.resolve_source(&DrugRecord::new("Tylenol"), &prepared);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_name, "Tylenol");
        assert_eq!(results[0].similarity_score, 1.0);
    }
}
