use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("threshold `{field}` = {value} is outside 0..={max}")]
    ThresholdOutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
