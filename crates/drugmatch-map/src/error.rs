use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read synonyms {}: {source}", path.display())]
    SynonymRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed synonyms {}: {source}", path.display())]
    SynonymParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write synonyms {}: {source}", path.display())]
    SynonymWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MapError>;
