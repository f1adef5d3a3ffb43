use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum LoadsumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Invalid run summary {}: {source}", path.display())]
    InvalidSummary {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Serialize for LoadsumError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
