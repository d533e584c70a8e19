//! # pdfmatch - page and line precise matches for PDF full-text search
//!
//! pdfmatch sits between a full-text index over extracted PDF page text and
//! the caller. It takes the raw hits of a fuzzy query and reports where each
//! match lives: source file, page number, line number and text, and the
//! rectangle the matched words occupy on the page.
//!
//! ## Architecture
//!
//! - [`store`] - Persisted location store (manifest + per-document page records)
//! - [`engine`] - Index engine and analyzer seams, plus an in-memory reference engine
//! - [`search`] - Query execution, phrase reconstruction and hit mapping
//! - [`config`] - Per-store search configuration
//! - [`error`] - Error types
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdfmatch::engine::MemoryEngine;
//! use pdfmatch::search_store;
//! use std::path::Path;
//!
//! let set = search_store(&MemoryEngine::default(), Path::new("/path/to/store"), "quick fox", 20)?;
//! for m in &set.best().matches {
//!     println!("{}:{}:{:?}", m.path, m.page_number, m.line_numbers);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod search;
pub mod store;

pub use config::{LineErrorPolicy, SearchConfig};
pub use error::{EngineError, Result, SearchError, StoreError};
pub use search::{Match, MatchSet, Searcher, Span, search_store};
