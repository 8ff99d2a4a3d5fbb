//! Document record types
//!
//! Defines the document row shape produced by the out-of-scope ingestion
//! process and read by search, plus the scored wrapper returned to callers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A legal document row in the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique document identifier
    pub doc_id: String,
    /// Display title
    pub title: String,
    /// Normalized comparison key derived from the title
    pub canonical_title: String,
    /// Document tags
    pub tags: Vec<String>,
    /// Short text excerpt used for preview and matching
    pub snippet: String,
    /// Opaque blob-storage locator (s3://bucket/key)
    pub s3_path: String,
    /// Language code ("en", ...)
    pub language: String,
}

/// A document paired with its relevance score, in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
}

/// Lowercase a title and collapse runs of whitespace into single spaces
pub fn canonicalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Document {
    /// Create a document with a generated UUID, deriving the canonical title
    pub fn new(
        title: String,
        tags: Vec<String>,
        snippet: String,
        s3_path: String,
        language: String,
    ) -> Self {
        let canonical_title = canonicalize_title(&title);
        Self {
            doc_id: Uuid::new_v4().to_string(),
            title,
            canonical_title,
            tags,
            snippet,
            s3_path,
            language,
        }
    }

    /// Create a document with a specific ID
    pub fn with_id(
        doc_id: String,
        title: String,
        tags: Vec<String>,
        snippet: String,
        s3_path: String,
        language: String,
    ) -> Self {
        let canonical_title = canonicalize_title(&title);
        Self {
            doc_id,
            title,
            canonical_title,
            tags,
            snippet,
            s3_path,
            language,
        }
    }
}
