use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Acceptance thresholds for fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Jaro-Winkler threshold, 0.0 to 1.0.
    pub jaro_winkler: f64,
    /// Minimum Jaccard overlap for a pair to be scored at all.
    pub jaccard: f64,
    /// Token-set ratio threshold, 0 to 100.
    pub token_set: f64,
    /// Levenshtein ratio threshold, 0 to 100.
    pub ratio: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            jaro_winkler: 0.85,
            jaccard: 0.10,
            token_set: 85.0,
            ratio: 85.0,
        }
    }
}

impl MatchThresholds {
    pub fn with_jaro_winkler(mut self, value: f64) -> Self {
        self.jaro_winkler = value;
        self
    }

    pub fn with_jaccard(mut self, value: f64) -> Self {
        self.jaccard = value;
        self
    }

    pub fn with_token_set(mut self, value: f64) -> Self {
        self.token_set = value;
        self
    }

    pub fn with_ratio(mut self, value: f64) -> Self {
        self.ratio = value;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_range("jaro_winkler", self.jaro_winkler, 1.0)?;
        check_range("jaccard", self.jaccard, 1.0)?;
        check_range("token_set", self.token_set, 100.0)?;
        check_range("ratio", self.ratio, 100.0)
    }
}

fn check_range(field: &'static str, value: f64, max: f64) -> Result<()> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ModelError::ThresholdOutOfRange { field, value, max })
    }
}

/// Column names used to read one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: String,
    pub approval_date: String,
    pub indication: String,
    pub identifier: String,
    pub orphan: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: "Drug Name".to_string(),
            approval_date: "Date of Approval".to_string(),
            indication: "Indication".to_string(),
            identifier: "RxCUI".to_string(),
            orphan: "Orphan".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Column names of the reference (target) dataset export.
    pub fn reference() -> Self {
        Self {
            name: "Generic Name".to_string(),
            approval_date: "Marketing Approval Date".to_string(),
            indication: "Approved Labeled Indication".to_string(),
            identifier: "RxCUI".to_string(),
            orphan: "Orphan Designation".to_string(),
        }
    }
}

/// Settings file contents. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugmatchConfig {
    pub thresholds: MatchThresholds,
    pub source_columns: ColumnMapping,
    pub reference_columns: ColumnMapping,
    pub synonym_min_score: f64,
}

impl Default for DrugmatchConfig {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            source_columns: ColumnMapping::default(),
            reference_columns: ColumnMapping::reference(),
            synonym_min_score: 85.0,
        }
    }
}

impl DrugmatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| ModelError::ConfigParse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.thresholds.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let thresholds = MatchThresholds::default();
        assert_eq!(thresholds.jaro_winkler, 0.85);
        assert_eq!(thresholds.jaccard, 0.10);
        assert_eq!(thresholds.token_set, 85.0);
        assert_eq!(thresholds.ratio, 85.0);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DrugmatchConfig::from_toml_str(
            "[thresholds]\njaro_winkler = 0.9\n\n[source_columns]\nname = \"Product\"\n",
        )
        .expect("parse config");
        assert_eq!(config.thresholds.jaro_winkler, 0.9);
        assert_eq!(config.thresholds.token_set, 85.0);
        assert_eq!(config.source_columns.name, "Product");
        assert_eq!(config.source_columns.identifier, "RxCUI");
        assert_eq!(config.reference_columns, ColumnMapping::reference());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = DrugmatchConfig::from_toml_str("[thresholds]\ntoken_set = 140.0\n")
            .expect_err("should reject");
        assert!(matches!(
            err,
            ModelError::ThresholdOutOfRange {
                field: "token_set",
                ..
            }
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = DrugmatchConfig::load(&dir.path().join("missing.toml")).expect_err("missing");
        assert!(err.to_string().contains("missing.toml"));
    }
}
