use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use drugmatch_model::DrugRecord;
use drugmatch_text::{jaro_winkler, normalize};

use crate::rules::special_target;

/// Known single-ingredient names in normalized form.
///
/// Terms are kept sorted so that iteration, persistence and tie-breaking in
/// [`Vocabulary::best_match`] are deterministic. Serializes as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    terms: BTreeSet<String>,
}

/// Closest vocabulary term for some input and its Jaro-Winkler score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VocabularyMatch<'a> {
    pub term: &'a str,
    pub score: f64,
}

impl Vocabulary {
    /// Normalizes and deduplicates the names; empty results are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = names
            .into_iter()
            .map(|name| normalize(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self { terms }
    }

    /// Vocabulary of a reference dataset.
    pub fn from_records(records: &[DrugRecord]) -> Self {
        let terms: BTreeSet<String> = records
            .iter()
            .filter(|record| record.has_name())
            .map(|record| record.normalized_name.clone())
            .collect();
        debug!(
            records = records.len(),
            terms = terms.len(),
            "built vocabulary"
        );
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.terms.contains(normalized)
    }

    /// The stored term equal to `normalized`, if any.
    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.terms.get(normalized).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Best vocabulary term for `term`.
    ///
    /// Special combination phrases resolve to their canonical term with a
    /// score of 1.0. Otherwise every term is scored with Jaro-Winkler and the
    /// first strictly highest score wins. Returns `None` for an empty
    /// vocabulary or a term that normalizes to nothing.
    pub fn best_match(&self, term: &str) -> Option<VocabularyMatch<'_>> {
        let normalized = normalize(term);
        if normalized.is_empty() || self.is_empty() {
            return None;
        }
        if let Some(target) = special_target(&normalized, self) {
            return Some(VocabularyMatch {
                term: target,
                score: 1.0,
            });
        }
        if let Some(exact) = self.get(&normalized) {
            return Some(VocabularyMatch {
                term: exact,
                score: 1.0,
            });
        }

        let mut best: Option<VocabularyMatch<'_>> = None;
        for candidate in self.iter() {
            let score = jaro_winkler(&normalized, candidate);
            if best.is_none_or(|current| score > current.score) {
                best = Some(VocabularyMatch {
                    term: candidate,
                    score,
                });
            }
        }
        best
    }

    /// Score of the best match, 0.0 when there is none.
    pub fn best_score(&self, term: &str) -> f64 {
        self.best_match(term).map_or(0.0, |found| found.score)
    }
}

impl FromIterator<String> for Vocabulary {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self::from_names(iter)
    }
}
