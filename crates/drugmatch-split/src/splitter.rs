//! Decomposition of combination product names into ingredients.

use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use drugmatch_text::{normalize, title_case};

use crate::parens::{extract_parentheticals, split_by_delimiters, split_on_and};
use crate::rules::{SPECIAL_COMBINATIONS, normalized_rules, special_target};
use crate::vocabulary::Vocabulary;

/// Spans scoring at least this against the vocabulary are kept verbatim, and
/// components at least this close are replaced by the vocabulary term.
pub const DIRECT_KEEP_THRESHOLD: f64 = 0.9;

/// Components scoring below this are not ingredients and are dropped.
pub const MIN_COMPONENT_SCORE: f64 = 0.8;

/// Vocabulary terms this short or shorter are ignored by the embedding scan.
pub const MIN_EMBEDDED_TERM_LEN: usize = 4;

/// Recursion limit for re-splitting parenthetical spans.
pub const MAX_SPAN_DEPTH: usize = 3;

const PLACEHOLDER_PREFIX: &str = "specialphrase";

static PHRASE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SPECIAL_COMBINATIONS
        .iter()
        .map(|rule| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(rule.phrase)))
                .expect("Invalid special phrase regex")
        })
        .collect()
});

/// Splits combination drug names against a vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct CombinationSplitter<'v> {
    vocabulary: &'v Vocabulary,
}

/// Special phrases swapped out of a name before delimiter splitting.
#[derive(Debug, Default)]
struct Placeholders {
    phrases: Vec<String>,
}

impl Placeholders {
    fn protect(&mut self, name: &str) -> String {
        let mut protected = name.to_string();
        for pattern in PHRASE_PATTERNS.iter() {
            while let Some((range, phrase)) = pattern
                .find(&protected)
                .map(|found| (found.range(), found.as_str().to_string()))
            {
                let token = format!("{PLACEHOLDER_PREFIX}{}", self.phrases.len());
                self.phrases.push(phrase);
                protected.replace_range(range, &token);
            }
        }
        protected
    }

    fn restore(&self, text: &str) -> String {
        let mut restored = text.to_string();
        // Highest index first so `..1` never clobbers `..10`.
        for (idx, phrase) in self.phrases.iter().enumerate().rev() {
            restored = restored.replace(&format!("{PLACEHOLDER_PREFIX}{idx}"), phrase);
        }
        restored
    }
}

impl<'v> CombinationSplitter<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Canonical, title-cased ingredient names for `raw`, deduplicated in
    /// discovery order.
    ///
    /// An empty vocabulary disables splitting and the trimmed input is
    /// returned title-cased as the only component. A name that normalizes to
    /// nothing yields no components.
    pub fn split(&self, raw: &str) -> Vec<String> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Vec::new();
        }
        if self.vocabulary.is_empty() {
            return vec![title_case(raw.trim())];
        }

        if let Some(target) = special_target(&normalized, self.vocabulary) {
            return vec![title_case(target)];
        }

        if !looks_combined(raw) {
            return vec![title_case(raw.trim())];
        }

        let embedded = self.embedded_terms(&normalized);
        if embedded.len() >= 2 {
            debug!(name = raw, components = embedded.len(), "split by embedded terms");
            return embedded.iter().map(|term| title_case(term)).collect();
        }

        let mut placeholders = Placeholders::default();
        let protected = placeholders.protect(raw);
        let (backbone, spans) = extract_parentheticals(&protected);

        let mut components: Vec<String> = split_by_delimiters(&backbone)
            .iter()
            .map(|part| placeholders.restore(part))
            .collect();
        for span in &spans {
            self.expand_span(&placeholders.restore(span), 0, &mut components);
        }

        let components = self.resolve_conjunctions(components);
        let result = dedup(self.canonicalize(&components));
        debug!(name = raw, components = result.len(), "split by delimiters");
        result
    }

    /// Vocabulary terms occurring as whole words in a normalized name.
    ///
    /// Special phrases count as their canonical term. A match lying inside a
    /// longer match is suppressed, so "calcium" does not survive next to
    /// "calcium folinate". Results are ordered by position.
    fn embedded_terms(&self, normalized: &str) -> Vec<String> {
        let mut hits: Vec<(usize, usize, &str)> = Vec::new();
        for term in self.vocabulary.iter() {
            if term.chars().count() > MIN_EMBEDDED_TERM_LEN {
                hits.extend(whole_word_spans(normalized, term).map(|(s, e)| (s, e, term)));
            }
        }
        for (phrase, rule) in normalized_rules() {
            if let Some(target) = self.vocabulary.get(rule.canonical) {
                hits.extend(whole_word_spans(normalized, phrase).map(|(s, e)| (s, e, target)));
            }
        }

        let mut kept: Vec<(usize, usize, &str)> = hits
            .iter()
            .filter(|&&(start, end, _)| {
                !hits.iter().any(|&(other_start, other_end, _)| {
                    other_start <= start && end <= other_end && other_end - other_start > end - start
                })
            })
            .copied()
            .collect();
        kept.sort_by_key(|&(start, end, _)| (start, Reverse(end)));

        dedup(kept.into_iter().map(|(_, _, term)| term.to_string()).collect())
    }

    fn expand_span(&self, span: &str, depth: usize, out: &mut Vec<String>) {
        if is_abbreviation(span) {
            trace!(span, "skipping abbreviation");
            return;
        }
        if self.vocabulary.best_score(span) >= DIRECT_KEEP_THRESHOLD {
            out.push(span.to_string());
            return;
        }
        if depth >= MAX_SPAN_DEPTH {
            out.push(span.to_string());
            return;
        }

        let (backbone, inner) = extract_parentheticals(span);
        let parts = split_by_delimiters(&backbone);
        if parts.len() > 1 || !inner.is_empty() {
            out.extend(parts.into_iter().filter(|part| !is_abbreviation(part)));
            for nested in &inner {
                self.expand_span(nested, depth + 1, out);
            }
            return;
        }

        let embedded = self.embedded_terms(&normalize(span));
        if embedded.is_empty() {
            out.push(span.to_string());
        } else {
            out.extend(embedded.iter().map(|term| title_case(term)));
        }
    }

    /// Splits "X and Y" only when both sides are strong vocabulary matches
    /// and the whole component is not one.
    fn resolve_conjunctions(&self, components: Vec<String>) -> Vec<String> {
        let mut resolved = Vec::with_capacity(components.len());
        for component in components {
            let normalized = normalize(&component);
            if special_target(&normalized, self.vocabulary).is_some()
                || !component.to_lowercase().contains(" and ")
                || self.vocabulary.best_score(&component) >= DIRECT_KEEP_THRESHOLD
            {
                resolved.push(component);
                continue;
            }

            match split_on_and(&component).as_slice() {
                [left, right]
                    if self.vocabulary.best_score(left) >= DIRECT_KEEP_THRESHOLD
                        && self.vocabulary.best_score(right) >= DIRECT_KEEP_THRESHOLD =>
                {
                    resolved.push(left.to_string());
                    resolved.push(right.to_string());
                }
                _ => resolved.push(component),
            }
        }
        resolved
    }

    fn canonicalize(&self, components: &[String]) -> Vec<String> {
        let mut canonical = Vec::with_capacity(components.len());
        for component in components {
            let normalized = normalize(component);
            if normalized.is_empty() {
                continue;
            }
            if let Some(target) = special_target(&normalized, self.vocabulary) {
                canonical.push(title_case(target));
                continue;
            }
            let Some(found) = self.vocabulary.best_match(&normalized) else {
                continue;
            };
            if found.score < MIN_COMPONENT_SCORE {
                trace!(component = %component, score = found.score, "dropping unmatched component");
            } else if found.score < DIRECT_KEEP_THRESHOLD {
                canonical.push(title_case(component.trim()));
            } else {
                canonical.push(title_case(found.term));
            }
        }
        canonical
    }
}

/// Splits `raw` with a throwaway [`CombinationSplitter`].
pub fn split(raw: &str, vocabulary: &Vocabulary) -> Vec<String> {
    CombinationSplitter::new(vocabulary).split(raw)
}

fn looks_combined(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    raw.contains(['(', ',', '/', '+', '&']) || lower.contains(" and ") || lower.contains(" with ")
}

/// Brand codes and short abbreviations such as "ABC" or "3TC".
fn is_abbreviation(text: &str) -> bool {
    let len = text.chars().count();
    len <= 3 || (is_all_uppercase(text) && len <= 5) || text.chars().any(|c| c.is_ascii_digit())
}

fn is_all_uppercase(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

/// Byte ranges where `needle` occurs in `haystack` bounded by spaces or the
/// string ends. Both inputs are normalized text.
fn whole_word_spans<'a>(
    haystack: &'a str,
    needle: &'a str,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    haystack
        .match_indices(needle)
        .map(|(start, found)| (start, start + found.len()))
        .filter(|&(start, end)| {
            let before = start == 0 || haystack.as_bytes()[start - 1] == b' ';
            let after = end == haystack.len() || haystack.as_bytes()[end] == b' ';
            before && after
        })
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
