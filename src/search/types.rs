use crate::engine::Occurrence;
use crate::store::{BoundingBoxTable, Rect};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A candidate alignment of the query terms against consecutive document positions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Phrase {
    /// Number of aligned query terms
    pub score: u32,
    /// Aligned terms, in query order
    pub terms: Vec<String>,
    /// Occurrences of the aligned terms, parallel to `terms`
    pub locations: Vec<Occurrence>,
    /// Byte offset of the first aligned occurrence
    pub start: u32,
    /// Byte offset one past the last aligned occurrence
    pub end: u32,
}

/// Offsets in extracted page text that span a phrase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    pub score: f64,
}

impl From<&Phrase> for Span {
    fn from(phrase: &Phrase) -> Self {
        Self {
            start: phrase.start,
            end: phrase.end,
            score: f64::from(phrase.score),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}({})", self.start, self.end, self.score)
    }
}

/// A single search match on one PDF page
#[derive(Debug, Clone)]
pub struct Match {
    /// Path of the PDF file as stored in the location store
    pub path: String,
    /// 1-based page number
    pub page_number: u32,
    /// 1-based line number of each span within the extracted page text
    pub line_numbers: Vec<u32>,
    /// Text of the line containing each span
    pub lines: Vec<String>,
    /// Page bounding box of each span, when the table covers it
    pub boxes: Vec<Option<Rect>>,
    /// Bounding-box table of the whole page
    pub table: Arc<BoundingBoxTable>,
    /// Index engine score of the hit
    pub score: f64,
    /// Highlighted fragment returned by the engine
    pub fragment: String,
    pub spans: Vec<Span>,
    pub doc_idx: u64,
    pub page_idx: u32,
}

const SHOW_SPANS: usize = 5;

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}:{} spans={} [",
            self.path,
            self.page_number,
            self.spans.len()
        )?;
        for (i, span) in self.spans.iter().take(SHOW_SPANS).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", span)?;
        }
        if self.spans.len() > SHOW_SPANS {
            write!(f, " ...")?;
        }
        write!(f, "] boxes={}", self.table.len())
    }
}

/// Per-call counters for hits that did not become matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchDiagnostics {
    /// Hits whose terms did not align into any phrase
    pub not_found_hits: usize,
    /// Hits dropped because a span fell outside its page text
    pub line_lookup_failures: usize,
}

/// Result of a search over a location store
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    /// Matches reported by the index engine, before truncation and mapping
    pub total_matches: usize,
    pub search_duration: Duration,
    pub matches: Vec<Match>,
    pub diagnostics: MatchDiagnostics,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }
}

impl fmt::Display for MatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total_matches == 0 {
            return writeln!(f, "No matches");
        }
        if self.matches.is_empty() {
            return writeln!(
                f,
                "{} matches, search took {:?}",
                self.total_matches, self.search_duration
            );
        }
        writeln!(
            f,
            "{} matches, showing {}, search took {:?}",
            self.total_matches,
            self.matches.len(),
            self.search_duration
        )?;
        for (i, m) in self.matches.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, m)?;
        }
        Ok(())
    }
}
