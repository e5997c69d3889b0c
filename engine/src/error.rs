//! Error types for the mockdb engine.

use crate::{CollectionName, RecordId};
use std::path::PathBuf;
use thiserror::Error;

/// All possible errors from the mockdb engine.
#[derive(Debug, Error)]
pub enum Error {
    // Domain errors
    #[error("collection not found: {0}")]
    CollectionNotFound(CollectionName),

    #[error("entry not found: {0}")]
    EntryNotFound(RecordId),

    #[error("no generated id left in collection: {0}")]
    IdsExhausted(CollectionName),

    // Startup errors
    #[error("failed to load database file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed database file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Persistence errors
    #[error("failed to persist database file {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode database: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is one of the expected "not found" outcomes
    /// (as opposed to an infrastructure failure).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::CollectionNotFound(_) | Error::EntryNotFound(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
