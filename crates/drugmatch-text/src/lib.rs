//! Text primitives for drug name reconciliation.
//!
//! This crate is the leaf of the workspace. It provides:
//!
//! - **Normalization**: [`normalize`] folds free-text drug names into a
//!   comparable form (lowercase, accent-stripped, punctuation-free).
//! - **Similarity**: Jaro-Winkler, token-set ratio and Levenshtein ratio
//!   between two normalized names ([`SimilarityScores`]).
//! - **Candidate filtering**: the [`jaccard`] token-overlap score used as a
//!   cheap pre-filter before full scoring.
//!
//! # Example
//!
//! ```
//! use drugmatch_text::{SimilarityScores, jaccard, normalize};
//!
//! let left = normalize("Paracétamol, 500");
//! assert_eq!(left, "paracetamol 500");
//!
//! let scores = SimilarityScores::compute(&left, "paracetamol");
//! assert!(scores.token_set > 80.0);
//! assert!(jaccard(&left, "paracetamol") > 0.0);
//! ```

#![deny(unsafe_code)]

mod jaccard;
mod normalize;
mod similarity;

pub use jaccard::{jaccard, jaccard_sets, token_set};
pub use normalize::{normalize, normalize_optional, title_case};
pub use similarity::{
    SimilarityScores, jaro_winkler, jaro_winkler_optional, levenshtein_ratio, token_set_ratio,
};
