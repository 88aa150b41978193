use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode HAR document: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to parse profile {path:?}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid url pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
