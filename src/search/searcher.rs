use super::executor::QueryExecutor;
use super::mapper::{HitMapper, HitOutcome};
use super::types::MatchSet;
use crate::config::{CONFIG_FILE, SearchConfig};
use crate::engine::{Analyzer, IndexEngine, IndexHandle, StandardAnalyzer};
use crate::error::{Result, SearchError};
use crate::store::LocationStore;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// An opened store: index handle, location store, analyzer and config
///
/// One `Searcher` serves any number of concurrent searches.
pub struct Searcher<H: IndexHandle> {
    handle: H,
    store: LocationStore,
    analyzer: Box<dyn Analyzer>,
    config: SearchConfig,
    store_path: PathBuf,
}

impl<H: IndexHandle> Searcher<H> {
    /// Open the store at `store_dir` with its index opened by `engine`
    pub fn open<E>(engine: &E, store_dir: &Path) -> Result<Self>
    where
        E: IndexEngine<Handle = H>,
    {
        let config = SearchConfig::load(store_dir).map_err(|e| SearchError::StoreOpen {
            path: store_dir.join(CONFIG_FILE),
            source: Box::new(e),
        })?;

        let index_path = store_dir.join(&config.index_dir);
        let handle = engine
            .open(&index_path)
            .map_err(|e| SearchError::StoreOpen {
                path: index_path.clone(),
                source: Box::new(e),
            })?;

        let store = LocationStore::open(store_dir).map_err(|e| SearchError::StoreOpen {
            path: store_dir.to_path_buf(),
            source: Box::new(e),
        })?;

        tracing::info!(
            store = %store_dir.display(),
            files = store.manifest().file_count(),
            pages = store.page_count(),
            "opened store"
        );

        Ok(Self {
            handle,
            store,
            analyzer: Box::new(StandardAnalyzer::english()),
            config,
            store_path: store_dir.to_path_buf(),
        })
    }

    /// Replace the query analyzer; it must match the one used at index time
    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Search for `term`, mapping at most `max_results` hits to matches
    pub fn search(&self, term: &str, max_results: usize) -> Result<MatchSet> {
        let deadline = self.config.timeout().map(|t| Instant::now() + t);
        self.search_until(term, max_results, deadline)
    }

    /// As [`search`](Self::search), giving up once `deadline` has passed
    pub fn search_until(
        &self,
        term: &str,
        max_results: usize,
        deadline: Option<Instant>,
    ) -> Result<MatchSet> {
        let executor = QueryExecutor::new(
            &self.handle,
            &self.store,
            self.analyzer.as_ref(),
            &self.config,
        );
        let executed = executor.search(term, max_results, deadline)?;

        let mut set = MatchSet {
            total_matches: executed.total as usize,
            search_duration: executed.took,
            ..Default::default()
        };

        let mapper = HitMapper::new(&self.store, &self.config.field, self.config.line_errors);
        for hit in executed.hits.iter().take(max_results) {
            match mapper.to_match(&executed.tokens, hit) {
                Ok(HitOutcome::Matched(m)) => set.matches.push(m),
                Ok(HitOutcome::NotFound) => set.diagnostics.not_found_hits += 1,
                Ok(HitOutcome::Unlocatable { .. }) => set.diagnostics.line_lookup_failures += 1,
                Err(e) => {
                    tracing::error!(
                        term,
                        store = %self.store_path.display(),
                        id = %hit.id,
                        error = %e,
                        "failed to map hit"
                    );
                    return Err(SearchError::Hit {
                        term: term.to_string(),
                        store: self.store_path.clone(),
                        id: hit.id.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        tracing::info!(
            term,
            total = set.total_matches,
            matches = set.matches.len(),
            not_found = set.diagnostics.not_found_hits,
            unlocatable = set.diagnostics.line_lookup_failures,
            took = ?set.search_duration,
            "search complete"
        );
        Ok(set)
    }

    /// Run one search per term in parallel, results in input order
    pub fn search_batch(&self, terms: &[&str], max_results: usize) -> Vec<Result<MatchSet>> {
        terms
            .par_iter()
            .map(|term| self.search(term, max_results))
            .collect()
    }
}
