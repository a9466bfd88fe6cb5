use std::io;

/// Errors that can occur during atomizer operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Malformed test record: {0}")]
    MalformedTestRecord(String),

    #[error("Unextractable prerequisite: {0}")]
    UnextractablePrerequisite(String),

    #[error("Payload error: {0}")]
    PayloadError(String),

    #[error("Repository error: {0}")]
    RepoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Yaml error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for atomizer operations
pub type Result<T> = std::result::Result<T, Error>;
