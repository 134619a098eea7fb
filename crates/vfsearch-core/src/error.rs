//! Error types for vfsearch.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vfsearch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Repository read failed
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    /// Content extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Index writer operation failed
    #[error("writer error: {0}")]
    Writer(#[from] WriterError),

    /// Update planning failed
    #[error("planning error: {0}")]
    Planning(#[from] PlanError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Repository read errors.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("resource not found: {0}")]
    NotFound(PathBuf),

    #[error("repository unreachable: {0}")]
    Unreachable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no factory for type {type_id}, mime {mime:?}")]
    UnsupportedType { type_id: u32, mime: Option<String> },

    #[error("extraction failed: {0}")]
    Failed(String),

    #[error("extraction cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Index writer errors.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("upsert failed: {0}")]
    Upsert(String),

    #[error("delete failed: {0}")]
    Delete(String),

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("optimize failed: {0}")]
    Optimize(String),

    #[error("close failed: {0}")]
    Close(String),

    #[error("writer initialization failed: {0}")]
    Init(String),
}

/// Update planning errors. Raised only on unrecoverable backing-store
/// access failure; the caller logs and moves on to the next scope.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("scope {scope}: {source}")]
    Read {
        scope: String,
        #[source]
        source: ReadError,
    },

    #[error("scope {0} cannot be resolved: {1}")]
    Scope(String, String),
}

/// Result type alias for vfsearch operations.
pub type Result<T> = std::result::Result<T, Error>;
