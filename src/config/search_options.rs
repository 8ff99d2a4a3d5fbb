//! Search option structures
//!
//! Per-request knobs for the search pipeline.

use crate::store::MAX_RESULTS;
use serde::{Deserialize, Serialize};

/// Options for one search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Language override; when unset the normalized query's language is used
    pub language: Option<String>,
    /// Number of results to return, capped at the storage limit
    pub limit: usize,
    /// Skip similarity scoring and return hits in storage order
    pub skip_scoring: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: None,
            limit: MAX_RESULTS,
            skip_scoring: false,
        }
    }
}

impl SearchOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language override
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Set the result limit (capped at the storage maximum)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_RESULTS);
        self
    }

    /// Set whether to skip scoring
    pub fn with_skip_scoring(mut self, skip: bool) -> Self {
        self.skip_scoring = skip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SearchOptions::default();
        assert!(opts.language.is_none());
        assert_eq!(opts.limit, MAX_RESULTS);
        assert!(!opts.skip_scoring);
    }

    #[test]
    fn test_builder() {
        let opts = SearchOptions::new()
            .with_language(Some("hi".to_string()))
            .with_limit(5)
            .with_skip_scoring(true);
        assert_eq!(opts.language.as_deref(), Some("hi"));
        assert_eq!(opts.limit, 5);
        assert!(opts.skip_scoring);
    }

    #[test]
    fn test_limit_capped() {
        let opts = SearchOptions::new().with_limit(500);
        assert_eq!(opts.limit, MAX_RESULTS);
    }
}
