use crate::config::SearchConfig;
use crate::engine::{Analyzer, IndexHandle, Operator, QuerySpec, RawHit, Token};
use crate::error::{Result, SearchError};
use crate::store::LocationStore;
use std::time::{Duration, Instant};

/// The engine's answer to one search, with the token stream that produced it
#[derive(Debug, Clone, Default)]
pub struct ExecutedQuery {
    /// Analyzed query terms, in query order
    pub tokens: Vec<Token>,
    pub hits: Vec<RawHit>,
    /// Matching pages before truncation to `max_results`
    pub total: u64,
    pub took: Duration,
}

/// Query executor
pub struct QueryExecutor<'a, H: IndexHandle> {
    handle: &'a H,
    store: &'a LocationStore,
    analyzer: &'a dyn Analyzer,
    config: &'a SearchConfig,
}

impl<'a, H: IndexHandle> QueryExecutor<'a, H> {
    pub fn new(
        handle: &'a H,
        store: &'a LocationStore,
        analyzer: &'a dyn Analyzer,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            handle,
            store,
            analyzer,
            config,
        }
    }

    /// Build the query spec for analyzed `tokens`
    pub fn query_spec(
        &self,
        tokens: &[Token],
        max_results: usize,
        deadline: Option<Instant>,
    ) -> QuerySpec {
        QuerySpec {
            terms: tokens.iter().map(|t| t.term.clone()).collect(),
            operator: Operator::Or,
            fuzziness: self.config.fuzziness,
            field: self.config.field.clone(),
            highlight: true,
            max_hits: max_results,
            deadline,
        }
    }

    /// Issue a fuzzy OR query for `term` and return the raw hits
    pub fn search(
        &self,
        term: &str,
        max_results: usize,
        deadline: Option<Instant>,
    ) -> Result<ExecutedQuery> {
        if self.store.page_count() == 0 {
            tracing::info!(store = %self.store.root_path().display(), "empty location store");
            return Ok(ExecutedQuery::default());
        }

        let tokens = self.analyzer.analyze(term);
        tracing::debug!(
            term,
            tokens = ?tokens.iter().map(|t| t.term.as_str()).collect::<Vec<_>>(),
            "analyzed query"
        );
        if tokens.is_empty() {
            return Ok(ExecutedQuery::default());
        }

        let spec = self.query_spec(&tokens, max_results, deadline);
        let response = self
            .handle
            .query(&spec)
            .map_err(|source| SearchError::Query {
                term: term.to_string(),
                source,
            })?;

        tracing::debug!(
            term,
            hits = response.hits.len(),
            total = response.total,
            took = ?response.took,
            "query executed"
        );

        Ok(ExecutedQuery {
            tokens,
            hits: response.hits,
            total: response.total,
            took: response.took,
        })
    }
}
