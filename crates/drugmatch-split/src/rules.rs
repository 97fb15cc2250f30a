//! Static table of multi-word phrases that name a single ingredient.

use std::sync::LazyLock;

use drugmatch_text::normalize;

use crate::vocabulary::Vocabulary;

/// A phrase that generic delimiter splitting would wrongly break apart,
/// mapped to the vocabulary term it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialCombinationRule {
    pub phrase: &'static str,
    pub canonical: &'static str,
}

/// Consulted in order, before any generic splitting.
pub const SPECIAL_COMBINATIONS: &[SpecialCombinationRule] = &[
    SpecialCombinationRule {
        phrase: "folinic acid and calcium",
        canonical: "calcium folinate",
    },
    SpecialCombinationRule {
        phrase: "folinic acid with calcium",
        canonical: "calcium folinate",
    },
    SpecialCombinationRule {
        phrase: "folinic acid & calcium",
        canonical: "calcium folinate",
    },
    SpecialCombinationRule {
        phrase: "folinic acid + calcium",
        canonical: "calcium folinate",
    },
    SpecialCombinationRule {
        phrase: "folinic acid, calcium",
        canonical: "calcium folinate",
    },
    SpecialCombinationRule {
        phrase: "leucovorin",
        canonical: "calcium folinate",
    },
    SpecialCombinationRule {
        phrase: "calcium folinate",
        canonical: "calcium folinate",
    },
];

/// Rule phrases in normalized form, paired with their rule.
static NORMALIZED_RULES: LazyLock<Vec<(String, SpecialCombinationRule)>> = LazyLock::new(|| {
    SPECIAL_COMBINATIONS
        .iter()
        .map(|rule| (normalize(rule.phrase), *rule))
        .collect()
});

pub(crate) fn normalized_rules() -> &'static [(String, SpecialCombinationRule)] {
    &NORMALIZED_RULES
}

/// Canonical term for a normalized name that is exactly a rule phrase.
///
/// A rule only applies when its canonical term is in the vocabulary.
pub fn special_target<'v>(normalized: &str, vocabulary: &'v Vocabulary) -> Option<&'v str> {
    normalized_rules()
        .iter()
        .filter(|(phrase, _)| phrase == normalized)
        .find_map(|(_, rule)| vocabulary.get(rule.canonical))
}
