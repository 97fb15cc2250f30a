use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::DrugRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// Linked through a shared external identifier.
    ExactIdentifier,
    /// Accepted by metric consensus.
    Fuzzy,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::ExactIdentifier => "exact-identifier",
            MatchType::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved (source, target) pair.
///
/// Column names in serialized output follow the report headers, so this type
/// can be written directly with a CSV serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "Source Drug Name")]
    pub source_name: String,
    #[serde(rename = "Target Drug Name")]
    pub target_name: String,
    #[serde(rename = "Similarity Score")]
    pub similarity_score: f64,
    #[serde(rename = "Token Score")]
    pub token_score: Option<f64>,
    #[serde(rename = "Ratio Score")]
    pub ratio_score: Option<f64>,
    #[serde(rename = "Match Type")]
    pub match_type: MatchType,
    #[serde(rename = "Source Approval Date")]
    pub source_approval_date: Option<String>,
    #[serde(rename = "Target Approval Date")]
    pub target_approval_date: Option<String>,
    #[serde(rename = "Source Indication")]
    pub source_indication: Option<String>,
    #[serde(rename = "Target Indication")]
    pub target_indication: Option<String>,
    #[serde(rename = "Original Source Drug")]
    pub original_source_name: Option<String>,
    #[serde(rename = "Is Combination")]
    pub is_combination: bool,
}

impl MatchResult {
    /// Report column names, in field order.
    pub const HEADERS: [&'static str; 12] = [
        "Source Drug Name",
        "Target Drug Name",
        "Similarity Score",
        "Token Score",
        "Ratio Score",
        "Match Type",
        "Source Approval Date",
        "Target Approval Date",
        "Source Indication",
        "Target Indication",
        "Original Source Drug",
        "Is Combination",
    ];

    /// Pair linked by identifier. Per-metric scores are not computed.
    pub fn exact_identifier(source: &DrugRecord, target: &DrugRecord) -> Self {
        Self::from_pair(source, target, 1.0, None, None, MatchType::ExactIdentifier)
    }

    pub fn fuzzy(
        source: &DrugRecord,
        target: &DrugRecord,
        jaro_winkler: f64,
        token_set: f64,
        ratio: f64,
    ) -> Self {
        Self::from_pair(
            source,
            target,
            jaro_winkler,
            Some(token_set),
            Some(ratio),
            MatchType::Fuzzy,
        )
    }

    fn from_pair(
        source: &DrugRecord,
        target: &DrugRecord,
        similarity_score: f64,
        token_score: Option<f64>,
        ratio_score: Option<f64>,
        match_type: MatchType,
    ) -> Self {
        Self {
            source_name: source.name.clone(),
            target_name: target.name.clone(),
            similarity_score,
            token_score,
            ratio_score,
            match_type,
            source_approval_date: source.approval_date.clone(),
            target_approval_date: target.approval_date.clone(),
            source_indication: source.indication.clone(),
            target_indication: target.indication.clone(),
            original_source_name: source.original_name.clone(),
            is_combination: source.is_combination,
        }
    }
}
