//! In-memory reference index engine
//!
//! Small enough to reason about in tests, faithful to what the search core
//! expects from a real engine: fuzzy term expansion, per-field term locations
//! keyed by the indexed term, highlighted fragments and a pre-truncation total.

use super::fuzzy::levenshtein_within;
use super::{
    Analyzer, IndexEngine, IndexHandle, Occurrence, Operator, QueryResponse, QuerySpec, RawHit,
    StandardAnalyzer, TermLocationMap,
};
use crate::error::EngineError;
use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

/// Name of the persisted index file inside the index directory
pub const INDEX_FILE: &str = "index.json";

const HIGHLIGHT_BEFORE: &str = "<mark>";
const HIGHLIGHT_AFTER: &str = "</mark>";

/// Score multiplier for a term reached through edits
const FUZZY_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDoc {
    id: String,
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredIndex {
    field: String,
    docs: Vec<StoredDoc>,
}

/// Postings of one indexed term: (document ordinal, occurrences)
type Postings = Vec<(usize, Vec<Occurrence>)>;

/// Term-position index over a single text field
pub struct MemoryIndex {
    field: String,
    analyzer: StandardAnalyzer,
    docs: Vec<StoredDoc>,
    terms: BTreeMap<String, Postings>,
}

impl MemoryIndex {
    pub fn new(field: &str) -> Self {
        Self::with_analyzer(field, StandardAnalyzer::default())
    }

    pub fn with_analyzer(field: &str, analyzer: StandardAnalyzer) -> Self {
        Self {
            field: field.to_string(),
            analyzer,
            docs: Vec::new(),
            terms: BTreeMap::new(),
        }
    }

    /// Index `text` under the composite id `id`
    pub fn add(&mut self, id: &str, text: &str) {
        let ordinal = self.docs.len();
        let mut per_term: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        for token in self.analyzer.analyze(text) {
            per_term.entry(token.term).or_default().push(Occurrence {
                position: token.position,
                start: token.start,
                end: token.end,
            });
        }
        for (term, occurrences) in per_term {
            self.terms
                .entry(term)
                .or_default()
                .push((ordinal, occurrences));
        }
        self.docs.push(StoredDoc {
            id: id.to_string(),
            text: text.to_string(),
        });
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    /// Persist to `dir/index.json`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(INDEX_FILE);
        let file = BufWriter::new(File::create(&path)?);
        let stored = StoredIndex {
            field: self.field.clone(),
            docs: self.docs.clone(),
        };
        serde_json::to_writer(file, &stored)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Load `dir/index.json` and re-analyze its documents
    pub fn load(dir: &Path, analyzer: StandardAnalyzer) -> Result<Self, EngineError> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return Err(EngineError::NotFound(dir.to_path_buf()));
        }
        let file = BufReader::new(File::open(&path)?);
        let stored: StoredIndex = serde_json::from_reader(file)
            .map_err(|e| EngineError::Deserialization(e.to_string()))?;

        let mut index = Self::with_analyzer(&stored.field, analyzer);
        for doc in &stored.docs {
            index.add(&doc.id, &doc.text);
        }
        Ok(index)
    }

    /// Indexed terms within `fuzziness` edits of `term`
    fn expand(&self, term: &str, fuzziness: usize) -> Vec<(&str, &Postings, bool)> {
        if fuzziness == 0 {
            return self
                .terms
                .get_key_value(term)
                .map(|(t, p)| vec![(t.as_str(), p, true)])
                .unwrap_or_default();
        }
        self.terms
            .iter()
            .filter(|(t, _)| levenshtein_within(t, term, fuzziness))
            .map(|(t, p)| (t.as_str(), p, t.as_str() == term))
            .collect()
    }

    fn highlight(text: &str, locations: &TermLocationMap) -> String {
        let mut spans: Vec<(usize, usize)> = locations
            .values()
            .flatten()
            .map(|o| (o.start as usize, o.end as usize))
            .collect();
        spans.sort_unstable();
        spans.dedup();

        let mut out = String::with_capacity(text.len() + spans.len() * 13);
        let mut last = 0;
        for (start, end) in spans {
            if start < last || end > text.len() {
                continue;
            }
            out.push_str(&text[last..start]);
            out.push_str(HIGHLIGHT_BEFORE);
            out.push_str(&text[start..end]);
            out.push_str(HIGHLIGHT_AFTER);
            last = end;
        }
        out.push_str(&text[last..]);
        out
    }
}

#[derive(Default)]
struct DocAccumulator {
    score: f64,
    matched_query_terms: usize,
    locations: TermLocationMap,
}

impl IndexHandle for MemoryIndex {
    fn query(&self, spec: &QuerySpec) -> Result<QueryResponse, EngineError> {
        let started = Instant::now();
        let expired = || spec.deadline.is_some_and(|d| Instant::now() >= d);

        if spec.field != self.field || spec.terms.is_empty() {
            return Ok(QueryResponse {
                took: started.elapsed(),
                ..Default::default()
            });
        }

        let n = self.docs.len() as f64;
        let mut accumulators: FxHashMap<usize, DocAccumulator> = FxHashMap::default();

        for term in &spec.terms {
            if expired() {
                return Err(EngineError::DeadlineExceeded);
            }

            let mut seen_in: FxHashSet<usize> = FxHashSet::default();
            for (indexed, postings, exact) in self.expand(term, spec.fuzziness as usize) {
                let idf = (1.0 + n / postings.len() as f64).ln();
                let weight = if exact { 1.0 } else { FUZZY_WEIGHT };
                for (ordinal, occurrences) in postings {
                    let acc = accumulators.entry(*ordinal).or_default();
                    acc.score += (occurrences.len() as f64).sqrt() * idf * weight;
                    acc.locations
                        .entry(indexed.to_string())
                        .or_insert_with(|| occurrences.clone());
                    if seen_in.insert(*ordinal) {
                        acc.matched_query_terms += 1;
                    }
                }
            }
        }

        let required = match spec.operator {
            Operator::Or => 1,
            Operator::And => spec.terms.len(),
        };
        let mut matched: Vec<(usize, DocAccumulator)> = accumulators
            .into_iter()
            .filter(|(_, acc)| acc.matched_query_terms >= required)
            .collect();

        let total = matched.len() as u64;
        matched.sort_by(|(a_ord, a), (b_ord, b)| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| self.docs[*a_ord].id.cmp(&self.docs[*b_ord].id))
        });
        matched.truncate(spec.max_hits);

        let hits = matched
            .into_iter()
            .map(|(ordinal, acc)| {
                let doc = &self.docs[ordinal];
                let mut hit = RawHit {
                    id: doc.id.clone(),
                    score: acc.score,
                    fragments: HashMap::new(),
                    locations: HashMap::new(),
                };
                if spec.highlight {
                    let fragment = Self::highlight(&doc.text, &acc.locations);
                    hit.fragments.insert(self.field.clone(), vec![fragment]);
                    hit.locations.insert(self.field.clone(), acc.locations);
                }
                hit
            })
            .collect();

        Ok(QueryResponse {
            hits,
            total,
            took: started.elapsed(),
        })
    }
}

/// Opens [`MemoryIndex`] directories written by [`MemoryIndex::save`]
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    analyzer: StandardAnalyzer,
}

impl MemoryEngine {
    pub fn new(analyzer: StandardAnalyzer) -> Self {
        Self { analyzer }
    }
}

impl IndexEngine for MemoryEngine {
    type Handle = MemoryIndex;

    fn open(&self, path: &Path) -> Result<MemoryIndex, EngineError> {
        MemoryIndex::load(path, self.analyzer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn spec(terms: &[&str]) -> QuerySpec {
        QuerySpec {
            terms: terms.iter().map(|t| t.to_string()).collect(),
            operator: Operator::Or,
            fuzziness: 1,
            field: "Text".to_string(),
            highlight: true,
            max_hits: 10,
            deadline: None,
        }
    }

    fn setup_index() -> MemoryIndex {
        let mut index = MemoryIndex::new("Text");
        index.add("0000.0", "The quick brown fox jumps.");
        index.add("0000.1", "A lazy dog sleeps.");
        index.add("0001.0", "Quick thinking, quick action.");
        index
    }

    #[test]
    fn test_or_query_collects_locations() {
        let index = setup_index();
        let response = index.query(&spec(&["quick", "fox"])).unwrap();
        assert_eq!(response.total, 2);

        let hit = response.hits.iter().find(|h| h.id == "0000.0").unwrap();
        let locations = &hit.locations["Text"];
        assert_eq!(locations["quick"][0].position, 2);
        assert_eq!(locations["fox"][0].position, 4);
        assert_eq!(
            hit.fragments["Text"][0],
            "The <mark>quick</mark> brown <mark>fox</mark> jumps."
        );
    }

    #[test]
    fn test_fuzzy_locations_keyed_by_indexed_term() {
        let index = setup_index();
        let response = index.query(&spec(&["quik"])).unwrap();
        assert_eq!(response.total, 2);
        for hit in &response.hits {
            assert!(hit.locations["Text"].contains_key("quick"));
            assert!(!hit.locations["Text"].contains_key("quik"));
        }
    }

    #[test]
    fn test_and_query() {
        let index = setup_index();
        let mut and = spec(&["quick", "fox"]);
        and.operator = Operator::And;
        let response = index.query(&and).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.hits[0].id, "0000.0");
    }

    #[test]
    fn test_total_counts_before_truncation() {
        let index = setup_index();
        let mut one = spec(&["quick"]);
        one.max_hits = 1;
        let response = index.query(&one).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.hits.len(), 1);
        // Two occurrences of "quick" outscore one
        assert_eq!(response.hits[0].id, "0001.0");
    }

    #[test]
    fn test_other_field_matches_nothing() {
        let index = setup_index();
        let mut other = spec(&["quick"]);
        other.field = "Title".to_string();
        assert_eq!(index.query(&other).unwrap().total, 0);
    }

    #[test]
    fn test_expired_deadline() {
        let index = setup_index();
        let mut late = spec(&["quick"]);
        late.deadline = Some(Instant::now());
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(
            index.query(&late),
            Err(EngineError::DeadlineExceeded)
        ));
    }

    #[test]
    fn test_save_and_open() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("index");
        setup_index().save(&dir).unwrap();

        let engine = MemoryEngine::default();
        let index = engine.open(&dir).unwrap();
        assert_eq!(index.doc_count(), 3);
        assert_eq!(index.query(&spec(&["dog"])).unwrap().hits[0].id, "0000.1");

        assert!(matches!(
            engine.open(&temp_dir.path().join("missing")),
            Err(EngineError::NotFound(_))
        ));
    }
}
