//! Metadata extraction module
//!
//! Builds a fixed-shape metadata record for an uploaded document from its
//! raw HTML: the text of all content spans is concatenated and truncated to
//! 40% of its length for the preview snippet, with pass-through upload
//! fields wrapped around it. The section title and URLs are placeholders
//! filled in later in the upload flow.

use crate::errors::{LexError, Result};
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Fraction of the concatenated span text kept for the snippet
const SNIPPET_KEEP_FRACTION: f64 = 0.4;

/// Placeholder used until a real section title is assigned
const PLACEHOLDER_TITLE: &str = "----TBD----";

/// CSS selector for content spans in scraped pages
const CONTENT_SPAN_SELECTOR: &str = "span.content-element.text-span";

/// Upload-side fields passed through into the metadata record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadInfo {
    pub filename: String,
    pub extension: String,
    pub size_kb: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Fixed-shape metadata record for an uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: String,
    pub source_url: String,
    pub download_url: String,
    pub original_filename: String,
    pub file_extension: String,
    pub file_size_kb: u64,
    pub language: String,
    pub scrape_timestamp: DateTime<Utc>,
    pub snippet: String,
    pub tags: Vec<String>,
}

/// Extract a preview snippet from raw HTML
///
/// Concatenates the text of all content spans (space-joined, trimmed),
/// keeps the first `floor(0.4 * len)` characters, and appends an ellipsis
/// marker iff anything was dropped. No content spans yield an empty snippet.
pub fn extract_snippet(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(CONTENT_SPAN_SELECTOR).expect("content span selector is valid CSS");

    let spans: Vec<String> = document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if spans.is_empty() {
        return String::new();
    }

    let all_text = spans.join(" ");
    let total = all_text.chars().count();
    let keep = (total as f64 * SNIPPET_KEEP_FRACTION) as usize;

    let mut snippet: String = all_text.chars().take(keep).collect();
    let truncated = total > keep;
    snippet = snippet.trim().to_string();
    if truncated {
        snippet.push_str("...");
    }
    snippet
}

/// Wrap a snippet and upload fields into a metadata record
pub fn extract_metadata(html: &str, upload: &UploadInfo) -> Result<DocumentMetadata> {
    if upload.filename.trim().is_empty() {
        return Err(LexError::validation("filename", "missing required field"));
    }

    let snippet = extract_snippet(html);
    let title = PLACEHOLDER_TITLE.to_string();

    Ok(DocumentMetadata {
        tags: vec!["template".to_string(), "form".to_string(), title.clone()],
        title,
        source_url: "User-end".to_string(),
        download_url: "User-end".to_string(),
        original_filename: upload.filename.clone(),
        file_extension: upload.extension.clone(),
        file_size_kb: upload.size_kb,
        language: "en".to_string(),
        scrape_timestamp: upload.uploaded_at,
        snippet,
    })
}
