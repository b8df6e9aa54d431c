use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Coarse classification of a [`ResolveError`] for the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The path itself is unusable (400-class).
    ClientError,
    /// The path names something the registry does not know (404-class).
    NotFound,
    /// The resolver was built from bad metadata or config.
    Configuration,
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("malformed pivot path: {0}")]
    MalformedPivotPath(String),

    #[error("empty base path: {0}")]
    EmptyBasePath(String),

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("unknown relation '{relation}' on {owner}")]
    UnknownRelation { owner: String, relation: String },

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidPath(_)
            | ResolveError::MalformedPivotPath(_)
            | ResolveError::EmptyBasePath(_) => ErrorKind::ClientError,
            ResolveError::UnknownEntityType(_) | ResolveError::UnknownRelation { .. } => {
                ErrorKind::NotFound
            }
            ResolveError::InvalidRegistry(_) | ResolveError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
        }
    }

    /// Suggested HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::ClientError => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Configuration => 500,
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::InvalidRegistry(err.to_string())
    }
}

/// Failures of the shared cache tier. These are soft: the resolver logs them
/// and carries on without the shared tier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("shared cache timed out")]
    Timeout,

    #[error("shared cache unavailable: {0}")]
    Unavailable(String),

    #[error("shared cache codec error: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Codec(err.to_string())
    }
}
