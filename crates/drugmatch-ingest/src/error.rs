//! Error types for dataset ingestion and output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading datasets or writing artifacts.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Dataset file not found.
    #[error("dataset not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is neither CSV nor Parquet.
    #[error("unsupported dataset format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // === Parsing Errors ===
    /// Failed to parse a dataset with Polars.
    #[error("failed to parse dataset {path}: {message}")]
    DatasetParse { path: PathBuf, message: String },

    /// The name column is absent from a dataset.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Failed to serialize CSV output.
    #[error("failed to write CSV {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Vocabulary file is not a JSON array of strings.
    #[error("malformed vocabulary {path}: {source}")]
    VocabularyParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === Pipeline Errors ===
    /// Combination explosion needs a vocabulary to validate components.
    #[error("vocabulary is empty; build it from the reference dataset first")]
    EmptyVocabulary,

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/source.csv"),
        };
        assert_eq!(err.to_string(), "dataset not found: /data/source.csv");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("Drug Name".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
