//! Dataset ingestion and artifacts for drug matching.
//!
//! Loads CSV or Parquet datasets into [`DrugRecord`](drugmatch_model::DrugRecord)
//! values, cleans names and dates, explodes combination products into
//! per-ingredient records, and writes records, match reports and the
//! vocabulary back to disk.

#![deny(unsafe_code)]

pub mod clean;
pub mod dataset;
pub mod error;
pub mod explode;
pub mod output;

pub use clean::{
    CleanReport, clean_records, normalize_date, normalize_text, parse_orphan_flag, strip_forms,
};
pub use dataset::{
    COMBINATION_COLUMN, DatasetFormat, ORIGINAL_NAME_COLUMN, load_dataset, read_frame,
    records_from_frame, write_records,
};
pub use error::{IngestError, Result};
pub use explode::explode_combinations;
pub use output::{load_vocabulary, save_vocabulary, write_atomically, write_matches};
