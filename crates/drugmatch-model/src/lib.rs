pub mod config;
pub mod error;
pub mod matching;
pub mod record;

pub use config::{ColumnMapping, DrugmatchConfig, MatchThresholds};
pub use error::{ModelError, Result};
pub use matching::{MatchResult, MatchType};
pub use record::DrugRecord;
