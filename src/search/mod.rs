//! Search module
//!
//! Ties the pipeline together: raw user text goes through the query oracle,
//! the resulting terms filter the document store, and the rows come back
//! ranked by similarity to the raw query.

use crate::config::SearchOptions;
use crate::errors::Result;
use crate::normalizer::{NormalizedQuery, QueryOracle};
use crate::scoring::score_match;
use crate::store::{DocumentStore, ScoredDocument};

/// Search engine over a document store and a query oracle
pub struct SearchEngine<O: QueryOracle> {
    oracle: O,
    store: DocumentStore,
    default_language: String,
}

impl<O: QueryOracle> SearchEngine<O> {
    /// Create a search engine
    pub fn new(oracle: O, store: DocumentStore) -> Self {
        Self {
            oracle,
            store,
            default_language: "en".to_string(),
        }
    }

    /// Set the fallback language used when neither the options nor the
    /// normalized query carry one
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// Full pipeline: normalize, filter, score, rank
    pub async fn search(
        &self,
        raw_query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredDocument>> {
        let normalized = self.oracle.normalize(raw_query).await?;
        tracing::info!(
            terms = ?normalized.search_terms,
            language = %normalized.language,
            "query normalized"
        );
        self.search_normalized(&normalized, raw_query, options)
    }

    /// Filter and rank with an already-normalized query
    pub fn search_normalized(
        &self,
        query: &NormalizedQuery,
        raw_query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredDocument>> {
        search_documents(&self.store, query, raw_query, options, &self.default_language)
    }

    /// Access the underlying document store
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

/// Filter and rank store rows with an already-normalized query
///
/// Needs no oracle, so callers that already have keywords (the CLI `--terms`
/// path, tests) can use it directly. Scoring compares each row against the
/// raw query text, not the normalized terms. Hits are sorted by score
/// descending with a stable sort, so equal scores keep storage order. With
/// `skip_scoring` set, rows come back in storage order with a zero score.
pub fn search_documents(
    store: &DocumentStore,
    query: &NormalizedQuery,
    raw_query: &str,
    options: &SearchOptions,
    default_language: &str,
) -> Result<Vec<ScoredDocument>> {
    let language = options
        .language
        .as_deref()
        .or(if query.language.is_empty() {
            None
        } else {
            Some(query.language.as_str())
        })
        .unwrap_or(default_language);

    let rows = store.search(&query.search_terms, language)?;

    let mut scored: Vec<ScoredDocument> = rows
        .into_iter()
        .map(|document| {
            let score = if options.skip_scoring {
                0.0
            } else {
                score_match(&document, raw_query)
            };
            ScoredDocument { document, score }
        })
        .collect();

    if !options.skip_scoring {
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    }
    scored.truncate(options.limit);
    Ok(scored)
}
