//! Index engine and analyzer seams
//!
//! The full-text engine (tokenized storage, fuzzy querying, scoring and
//! highlighting) is a collaborator. This module defines what the search core
//! needs from it, plus a small in-memory reference engine.
//!
//! ## Modules
//!
//! - [`analyzer`] - Word tokenizer with stop-word removal
//! - [`fuzzy`] - Bounded edit distance (`reference-engine` feature)
//! - [`memory`] - Reference engine persisted as JSON (`reference-engine` feature)

pub mod analyzer;
#[cfg(feature = "reference-engine")]
pub mod fuzzy;
#[cfg(feature = "reference-engine")]
pub mod memory;

pub use analyzer::StandardAnalyzer;
#[cfg(feature = "reference-engine")]
pub use memory::{MemoryEngine, MemoryIndex};

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// A normalized query or document term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub term: String,
    /// 1-based ordinal position in the analyzed text
    pub position: u32,
    /// Byte offsets of the term in the analyzed text
    pub start: u32,
    pub end: u32,
}

/// One occurrence of a term in a document's extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Ordinal term position
    pub position: u32,
    /// Byte offset of the first byte of the term
    pub start: u32,
    /// Byte offset one past the last byte of the term
    pub end: u32,
}

/// Term -> occurrences within one document, in position order
pub type TermLocationMap = HashMap<String, Vec<Occurrence>>;

/// How query terms combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Or,
    And,
}

/// A query as issued to the index engine
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub terms: Vec<String>,
    pub operator: Operator,
    /// Permitted edits per term
    pub fuzziness: u8,
    /// Field the terms are matched against
    pub field: String,
    /// Return highlighted fragments and term locations for `field`
    pub highlight: bool,
    pub max_hits: usize,
    /// Give up once this instant has passed
    pub deadline: Option<Instant>,
}

/// The engine's answer for one matching document
#[derive(Debug, Clone, Default)]
pub struct RawHit {
    /// Composite document/page id
    pub id: String,
    pub score: f64,
    /// Highlighted text per field
    pub fragments: HashMap<String, Vec<String>>,
    /// Term locations per field
    pub locations: HashMap<String, TermLocationMap>,
}

/// Result of a query
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub hits: Vec<RawHit>,
    /// Matching documents before truncation to `max_hits`
    pub total: u64,
    pub took: Duration,
}

/// Language-specific tokenization
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<Token>;
}

/// An opened, read-only index
pub trait IndexHandle: Send + Sync {
    fn query(&self, spec: &QuerySpec) -> Result<QueryResponse, EngineError>;
}

/// Opens indexes stored on disk
pub trait IndexEngine {
    type Handle: IndexHandle;

    fn open(&self, path: &Path) -> Result<Self::Handle, EngineError>;
}
