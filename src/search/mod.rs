//! Search over a location store
//!
//! A search runs in two stages. The [`QueryExecutor`] analyzes the term and
//! issues a fuzzy OR query to the index engine. The [`HitMapper`] then turns
//! each raw hit into a [`Match`]: it decodes the composite page id, rebuilds
//! the best phrases from the hit's term locations, and resolves each phrase
//! to a line of the extracted page text and a rectangle on the page.
//!
//! ## Modules
//!
//! - [`id`] - Composite document/page identifiers
//! - [`lines`] - Byte offset to line mapping
//! - [`phrase`] - Phrase reconstruction
//! - [`mapper`] - Raw hit to match mapping
//! - [`executor`] - Query execution against the engine
//! - [`reduce`] - Best-span reduction and file listing
//! - [`searcher`] - Opened store serving concurrent searches

pub mod executor;
pub mod id;
pub mod lines;
pub mod mapper;
pub mod phrase;
pub mod reduce;
pub mod searcher;
pub mod types;

pub use executor::{ExecutedQuery, QueryExecutor};
pub use id::{decode_id, encode_id};
pub use lines::line_number;
pub use mapper::{HitMapper, HitOutcome};
pub use phrase::best_phrases;
pub use searcher::Searcher;
pub use types::{Match, MatchDiagnostics, MatchSet, Phrase, Span};

use crate::engine::IndexEngine;
use crate::error::Result;
use std::path::Path;

/// Search the store in `store_dir` for `term`
///
/// Opens the index with `engine` and the location store, then maps at most
/// `max_results` hits to matches. Use [`Searcher`] to keep the store open
/// across searches.
pub fn search_store<E: IndexEngine>(
    engine: &E,
    store_dir: &Path,
    term: &str,
    max_results: usize,
) -> Result<MatchSet> {
    Searcher::open(engine, store_dir)?.search(term, max_results)
}
