//! Error types for search and location store access.
//!
//! A hit that does not reconstruct into a phrase is not an error; see
//! [`HitOutcome::NotFound`](crate::search::HitOutcome).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for a search call.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The index or the location store could not be opened.
    #[error("could not open store {path:?}: {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The index engine rejected or failed the query.
    #[error("query for term {term:?} failed: {source}")]
    Query {
        term: String,
        #[source]
        source: EngineError,
    },

    /// A hit identifier is not of the form `{doc:hex}.{page:decimal}`.
    #[error("malformed hit id {id:?}: {reason}")]
    Decode { id: String, reason: String },

    /// A raw hit could not be mapped to a match.
    #[error("hit {id:?} for term {term:?} in store {store:?}: {source}")]
    Hit {
        term: String,
        store: PathBuf,
        id: String,
        #[source]
        source: Box<SearchError>,
    },

    /// A byte offset falls outside the extracted page text.
    #[error("offset {offset} not found in page text of {len} bytes")]
    LineLookup { offset: u32, len: usize },

    /// A location store record is missing or inconsistent.
    #[error("location store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reading the persisted location store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{file}: bad magic number")]
    BadMagic { file: String },

    #[error("{file}: unsupported version {version}")]
    UnsupportedVersion { file: String, version: u32 },

    #[error("{file}: truncated record ({needed} bytes needed, {available} available)")]
    Truncated {
        file: String,
        needed: usize,
        available: usize,
    },

    #[error("document {doc_idx} out of range ({count} documents)")]
    DocumentOutOfRange { doc_idx: u64, count: usize },

    #[error("page {page_idx} of document {doc_idx} out of range ({count} pages)")]
    PageOutOfRange {
        doc_idx: u64,
        page_idx: u32,
        count: usize,
    },

    #[error("{file}: invalid UTF-8 text")]
    InvalidText { file: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported by an index engine collaborator.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("index not found at {0:?}")]
    NotFound(PathBuf),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("query deadline exceeded")]
    DeadlineExceeded,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
