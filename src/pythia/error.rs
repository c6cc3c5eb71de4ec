use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`StoreError`], for callers that need to turn
/// failures into user-facing outcomes (HTTP status codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced record or login does not exist.
    NotFound,
    /// The request itself was malformed (bad identifier, bad config value).
    BadRequest,
    /// The login exists but the credential did not verify.
    Unauthorized,
    /// The data directory is unreadable, unwritable or holds bad documents.
    Storage,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("No {collection} record with id {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection} record {id} already exists")]
    AlreadyExists { collection: &'static str, id: String },

    #[error("No user found with login {0:?}")]
    LoginNotFound(String),

    #[error("Login refused: password does not match")]
    BadCredentials,

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document {}: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected file {name:?} in {}", dir.display())]
    CorruptState { dir: PathBuf, name: String },

    #[error("No identifiers left after the last document in {}", dir.display())]
    IdentifiersExhausted { dir: PathBuf },

    #[error("{collection} record {id} was written but the index could not be rebuilt: {source}")]
    StaleIndex {
        collection: &'static str,
        id: String,
        #[source]
        source: Box<StoreError>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn encoding(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Encoding {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidIdentifier(_)
            | StoreError::AlreadyExists { .. }
            | StoreError::Config(_) => ErrorKind::BadRequest,
            StoreError::NotFound { .. } | StoreError::LoginNotFound(_) => ErrorKind::NotFound,
            StoreError::BadCredentials => ErrorKind::Unauthorized,
            StoreError::Io { .. }
            | StoreError::Encoding { .. }
            | StoreError::CorruptState { .. }
            | StoreError::IdentifiersExhausted { .. }
            | StoreError::StaleIndex { .. } => ErrorKind::Storage,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
