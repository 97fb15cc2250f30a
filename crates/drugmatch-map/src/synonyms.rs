//! Variant → canonical name substitutions applied to source names.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use drugmatch_model::MatchResult;
use drugmatch_text::{normalize, token_set_ratio};

use crate::error::{MapError, Result};

/// Default minimum token-set ratio for [`generate_synonyms`].
pub const DEFAULT_SYNONYM_MIN_SCORE: f64 = 85.0;

/// Normalized variant names mapped to normalized canonical names.
///
/// Persisted as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymMap {
    entries: BTreeMap<String, String>,
}

impl SynonymMap {
    /// Builds a map from raw pairs. Both sides are normalized and pairs with
    /// an empty side are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(variant, canonical)| (normalize(variant.as_ref()), normalize(canonical.as_ref())))
            .filter(|(variant, canonical)| !variant.is_empty() && !canonical.is_empty())
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }

    /// The canonical name for `normalized`, or `normalized` itself.
    pub fn apply<'a>(&'a self, normalized: &'a str) -> &'a str {
        self.get(normalized).unwrap_or(normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Loads a synonym file.
    ///
    /// A missing file is not an error: a warning is logged and the map is
    /// empty. A file that exists but is not a JSON object of strings is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "synonyms file not found, continuing without synonyms");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| MapError::SynonymRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&text).map_err(|source| MapError::SynonymParse {
                path: path.to_path_buf(),
                source,
            })?;
        let synonyms = Self::from_pairs(raw);
        info!(path = %path.display(), count = synonyms.len(), "loaded synonyms");
        Ok(synonyms)
    }

    /// Writes the map as a JSON object, replacing `path` through a temporary
    /// file in the same directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_err = |source| MapError::SynonymWrite {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| MapError::SynonymParse {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;
        let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.persist(path).map_err(|err| write_err(err.error))?;
        info!(path = %path.display(), count = self.len(), "saved synonyms");
        Ok(())
    }
}

/// Proposes synonyms for names that found no match.
///
/// Each unmatched name is paired with the reference name of highest
/// token-set ratio (first one on ties); pairs scoring at least `min_score`
/// are kept.
pub fn generate_synonyms<U, R>(unmatched: U, reference: R, min_score: f64) -> SynonymMap
where
    U: IntoIterator,
    U::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let mut reference: Vec<String> = reference
        .into_iter()
        .map(|name| normalize(name.as_ref()))
        .filter(|name| !name.is_empty())
        .collect();
    reference.sort();
    reference.dedup();

    let mut entries = BTreeMap::new();
    for name in unmatched {
        let variant = normalize(name.as_ref());
        if variant.is_empty() {
            continue;
        }
        let mut best: Option<(&str, f64)> = None;
        for candidate in &reference {
            let score = token_set_ratio(&variant, candidate);
            if best.is_none_or(|(_, current)| score > current) {
                best = Some((candidate.as_str(), score));
            }
        }
        if let Some((canonical, score)) = best
            && score >= min_score
        {
            entries.insert(variant, canonical.to_string());
        }
    }
    info!(count = entries.len(), "generated synonyms");
    SynonymMap { entries }
}

/// Raw names rewritten by a synonym map, split by whether they matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SynonymCoverage {
    /// Entries in the synonym map.
    pub entries: usize,
    /// Rewritten names that appear as a source in the results.
    pub matched: Vec<String>,
    /// Rewritten names that are still unmatched.
    pub unmatched: Vec<String>,
}

impl SynonymCoverage {
    /// Number of raw names the map rewrote.
    pub fn rewritten(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

/// Checks which raw names the synonym map rewrote and whether each one ended
/// up matched.
///
/// Names are grouped by synonym entry in map order, then by input order.
/// A name counts as matched when some result's source name normalizes to the
/// same text.
pub fn synonym_coverage<N>(
    synonyms: &SynonymMap,
    names: N,
    results: &[MatchResult],
) -> SynonymCoverage
where
    N: IntoIterator,
    N::Item: AsRef<str>,
{
    let mut by_variant: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        let raw = name.as_ref().trim();
        let variant = normalize(raw);
        if synonyms.get(&variant).is_some() {
            by_variant.entry(variant).or_default().push(raw.to_string());
        }
    }
    let matched_sources: HashSet<String> =
        results.iter().map(|r| normalize(&r.source_name)).collect();

    let mut coverage = SynonymCoverage {
        entries: synonyms.len(),
        ..SynonymCoverage::default()
    };
    for (variant, raws) in by_variant {
        let bucket = if matched_sources.contains(&variant) {
            &mut coverage.matched
        } else {
            &mut coverage.unmatched
        };
        bucket.extend(raws);
    }
    info!(
        entries = coverage.entries,
        matched = coverage.matched.len(),
        unmatched = coverage.unmatched.len(),
        "checked synonym coverage"
    );
    coverage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_normalized() {
        let synonyms = SynonymMap::from_pairs([("Paracetamol", "ACETAMINOPHEN"), ("", "x")]);
        assert_eq!(synonyms.len(), 1);
        assert_eq!(synonyms.apply("paracetamol"), "acetaminophen");
        assert_eq!(synonyms.apply("aspirin"), "aspirin");
    }

    #[test]
    fn missing_file_gives_empty_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        let synonyms = SynonymMap::load(&dir.path().join("synonyms.json")).expect("load");
        assert!(synonyms.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("synonyms.json");
        fs::write(&path, "[1, 2, 3]").expect("write");
        assert!(matches!(
            SynonymMap::load(&path),
            Err(MapError::SynonymParse { .. })
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("synonyms.json");
        let synonyms = SynonymMap::from_pairs([("Paracetamol", "Acetaminophen")]);
        synonyms.save(&path).expect("save");
        assert_eq!(SynonymMap::load(&path).expect("load"), synonyms);

        let replacement = SynonymMap::from_pairs([("Amoxycillin", "Amoxicillin")]);
        replacement.save(&path).expect("save again");
        assert_eq!(SynonymMap::load(&path).expect("reload"), replacement);
        let files = fs::read_dir(path.parent().expect("parent")).expect("read dir").count();
        assert_eq!(files, 1);
    }

    #[test]
    fn coverage_splits_rewritten_names() {
        use drugmatch_model::DrugRecord;

        let synonyms = SynonymMap::from_pairs([
            ("Paracetamol", "Acetaminophen"),
            ("Amoxycillin", "Amoxicillin"),
            ("Frusemide", "Furosemide"),
        ]);
        let source = DrugRecord::new("PARACETAMOL");
        let target = DrugRecord::new("Acetaminophen");
        let results = [MatchResult::fuzzy(&source, &target, 1.0, 100.0, 100.0)];

        let coverage = synonym_coverage(
            &synonyms,
            ["Paracetamol", " PARACETAMOL ", "Amoxycillin", "Aspirin"],
            &results,
        );
        assert_eq!(coverage.entries, 3);
        assert_eq!(coverage.matched, ["Paracetamol", "PARACETAMOL"]);
        assert_eq!(coverage.unmatched, ["Amoxycillin"]);
        assert_eq!(coverage.rewritten(), 3);
    }

    #[test]
    fn generation_keeps_confident_pairs_only() {
        let synonyms = generate_synonyms(
            ["Amoxycillin Trihydrate", "Zzz Unknown", ""],
            ["amoxicillin trihydrate", "aspirin"],
            DEFAULT_SYNONYM_MIN_SCORE,
        );
        assert_eq!(synonyms.get("amoxycillin trihydrate"), Some("amoxicillin trihydrate"));
        assert_eq!(synonyms.get("zzz unknown"), None);
        assert_eq!(synonyms.len(), 1);
    }
}
