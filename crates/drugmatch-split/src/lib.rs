//! Ingredient vocabulary and combination name splitting.
//!
//! A [`Vocabulary`] is the set of known single-ingredient names taken from a
//! reference dataset. [`CombinationSplitter`] decomposes product names such
//! as `"Abacavir (ABC)/Lamivudine (3TC)"` into canonical ingredients that are
//! validated against it. Phrases naming one ingredient despite containing a
//! delimiter (see [`SPECIAL_COMBINATIONS`]) are protected from splitting.

pub mod parens;
pub mod rules;
pub mod splitter;
pub mod vocabulary;

pub use parens::{extract_parentheticals, split_by_delimiters};
pub use rules::{SPECIAL_COMBINATIONS, SpecialCombinationRule, special_target};
pub use splitter::{
    CombinationSplitter, DIRECT_KEEP_THRESHOLD, MAX_SPAN_DEPTH, MIN_COMPONENT_SCORE,
    MIN_EMBEDDED_TERM_LEN, split,
};
pub use vocabulary::{Vocabulary, VocabularyMatch};
