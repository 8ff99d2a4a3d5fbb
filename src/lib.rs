//! lexfind: Legal document search
//!
//! This library turns free-text legal drafting requests into ranked document
//! hits. An external language model normalizes the request into search
//! keywords, a SQLite-backed store filters documents by language, title,
//! snippet, and tags, and a character-level similarity ratio re-ranks the
//! results.
//!
//! # Modules
//!
//! - `config`: Application settings and per-request search options
//! - `errors`: Crate error enum and `Result` alias
//! - `normalizer`: Oracle HTTP client and query normalization
//! - `store`: Document records, SQLite store, connection pool
//! - `scoring`: Sequence-similarity match scorer
//! - `search`: The search pipeline tying the pieces together
//! - `extract`: HTML snippet/metadata extraction for uploads
//! - `locator`: Blob-storage locator parsing

pub mod config;
pub mod errors;
pub mod extract;
pub mod locator;
pub mod normalizer;
pub mod scoring;
pub mod search;
pub mod store;

// Re-export commonly used types
pub use config::{AppConfig, SearchOptions};
pub use errors::{LexError, Result};
pub use normalizer::{NormalizedQuery, QueryNormalizer, QueryOracle};
pub use search::{search_documents, SearchEngine};
pub use store::{Document, DocumentStore, ScoredDocument};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_exists() {
        assert_eq!(NAME, "lexfind");
    }
}
