//! Matching between a source drug dataset and a reference dataset.
//!
//! - [`consensus`]: Jaccard pre-filter and 2-of-3 metric voting
//! - [`resolver`]: identifier pass, fuzzy pass and best-per-source selection
//! - [`synonyms`]: variant substitution, synonym proposal and coverage
//! - [`sweep`]: coverage across threshold grids

#![deny(unsafe_code)]

pub mod consensus;
pub mod error;
pub mod resolver;
pub mod sweep;
pub mod synonyms;

pub use consensus::{ConsensusMatcher, is_high_confidence};
pub use error::{MapError, Result};
pub use resolver::{
    IdentityResolver, PreparedTarget, best_per_source, dedup_by_name, exact_identifier_matches,
};
pub use sweep::{SweepGrid, SweepRow, sweep};
pub use synonyms::{
    DEFAULT_SYNONYM_MIN_SCORE, SynonymCoverage, SynonymMap, generate_synonyms, synonym_coverage,
};
