//! Document store module
//!
//! SQLite-backed store for legal document rows. Search builds one
//! parameterized filter: language equality conjoined with, per search term,
//! a case-insensitive substring match on the canonical title or the snippet,
//! or exact case-insensitive tag membership. At most [`MAX_RESULTS`] rows
//! come back and no ordering is requested; callers must treat row order as
//! unstable.

mod document;
mod pool;

pub use document::{canonicalize_title, Document, ScoredDocument};
pub use pool::{ConnectionPool, PooledConnection};

use crate::errors::{LexError, Result};
use crate::locator::S3Locator;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use uuid::Uuid;

/// Hard cap on rows returned by a single search
pub const MAX_RESULTS: usize = 20;

/// Connections kept in the pool
const DEFAULT_POOL_SIZE: usize = 4;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    doc_id          TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    canonical_title TEXT NOT NULL,
    tags            TEXT NOT NULL,
    snippet         TEXT NOT NULL,
    snippet_lower   TEXT NOT NULL,
    s3_path         TEXT NOT NULL,
    language        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_language ON documents(language);
CREATE TABLE IF NOT EXISTS doc_tags (
    doc_id TEXT NOT NULL,
    tag    TEXT NOT NULL,
    PRIMARY KEY (doc_id, tag)
);
";

/// SQLite-backed document store
pub struct DocumentStore {
    pool: ConnectionPool,
}

impl DocumentStore {
    /// Open (or create) a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut connections = Vec::with_capacity(DEFAULT_POOL_SIZE);
        for _ in 0..DEFAULT_POOL_SIZE {
            connections.push(Connection::open(path)?);
        }
        Self::from_connections(connections)
    }

    /// Open an in-memory store (for tests and the demo CLI)
    ///
    /// Uses a uniquely named shared-cache database so every pooled
    /// connection sees the same tables.
    pub fn in_memory() -> Result<Self> {
        let uri = format!("file:lexfind-{}?mode=memory&cache=shared", Uuid::new_v4());
        let flags = OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI;
        let mut connections = Vec::with_capacity(DEFAULT_POOL_SIZE);
        for _ in 0..DEFAULT_POOL_SIZE {
            connections.push(Connection::open_with_flags(&uri, flags)?);
        }
        Self::from_connections(connections)
    }

    fn from_connections(connections: Vec<Connection>) -> Result<Self> {
        connections
            .first()
            .ok_or_else(|| LexError::Storage("pool requires at least one connection".to_string()))?
            .execute_batch(SCHEMA)?;
        Ok(Self {
            pool: ConnectionPool::new(connections),
        })
    }

    /// Insert a document; duplicate `doc_id` or a malformed storage locator
    /// is a validation error
    pub fn insert(&self, doc: &Document) -> Result<()> {
        S3Locator::parse(&doc.s3_path)?;

        let mut conn = self.pool.checkout()?;
        let tx = conn.transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM documents WHERE doc_id = ?",
                params![doc.doc_id],
                |_| Ok(true),
            )
            .map(|_| true)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(false),
                other => Err(other),
            })?;
        if exists {
            return Err(LexError::validation("doc_id", "document already exists"));
        }

        let tags_json = serde_json::to_string(&doc.tags)
            .map_err(|e| LexError::Storage(format!("failed to encode tags: {}", e)))?;
        tx.execute(
            "INSERT INTO documents
                 (doc_id, title, canonical_title, tags, snippet, snippet_lower, s3_path, language)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                doc.doc_id,
                doc.title,
                doc.canonical_title,
                tags_json,
                doc.snippet,
                doc.snippet.to_lowercase(),
                doc.s3_path,
                doc.language,
            ],
        )?;
        for tag in &doc.tags {
            tx.execute(
                "INSERT OR IGNORE INTO doc_tags (doc_id, tag) VALUES (?, ?)",
                params![doc.doc_id, tag.to_lowercase()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(doc_id = %doc.doc_id, "inserted document");
        Ok(())
    }

    /// Fetch a document by id
    pub fn get(&self, doc_id: &str) -> Result<Option<Document>> {
        let conn = self.pool.checkout()?;
        let row = conn
            .query_row(
                "SELECT doc_id, title, canonical_title, tags, snippet, s3_path, language
                 FROM documents WHERE doc_id = ?",
                params![doc_id],
                row_to_document,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(row)
    }

    /// Replace a document's snippet; missing target is a validation error
    pub fn update_snippet(&self, doc_id: &str, snippet: &str) -> Result<()> {
        let conn = self.pool.checkout()?;
        let changed = conn.execute(
            "UPDATE documents SET snippet = ?, snippet_lower = ? WHERE doc_id = ?",
            params![snippet, snippet.to_lowercase(), doc_id],
        )?;
        if changed == 0 {
            return Err(LexError::validation("doc_id", "document not found"));
        }
        Ok(())
    }

    /// Delete a document; missing target is a validation error
    pub fn delete(&self, doc_id: &str) -> Result<()> {
        let mut conn = self.pool.checkout()?;
        let tx = conn.transaction()?;
        let changed = tx.execute("DELETE FROM documents WHERE doc_id = ?", params![doc_id])?;
        if changed == 0 {
            return Err(LexError::validation("doc_id", "document not found"));
        }
        tx.execute("DELETE FROM doc_tags WHERE doc_id = ?", params![doc_id])?;
        tx.commit()?;
        Ok(())
    }

    /// Search documents matching every term in the requested language
    ///
    /// A term matches a row when it is a substring of the canonical title,
    /// a substring of the lowercased snippet, or exactly equal to one of the
    /// row's lowercased tags. An empty term list filters by language only.
    ///
    /// All three match modes compare Rust-lowercased text against the
    /// Rust-lowercased term; SQLite's `lower()` only folds ASCII, so the
    /// snippet and tags are persisted pre-lowered alongside the originals.
    pub fn search(&self, terms: &[String], language: &str) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT doc_id, title, canonical_title, tags, snippet, s3_path, language
             FROM documents WHERE language = ?",
        );
        let mut params: Vec<String> = vec![language.to_string()];

        for term in terms {
            let lowered = term.to_lowercase();
            sql.push_str(
                " AND (instr(canonical_title, ?) > 0
                    OR instr(snippet_lower, ?) > 0
                    OR EXISTS (SELECT 1 FROM doc_tags
                               WHERE doc_tags.doc_id = documents.doc_id
                                 AND doc_tags.tag = ?))",
            );
            params.push(lowered.clone());
            params.push(lowered.clone());
            params.push(lowered);
        }

        sql.push_str(&format!(" LIMIT {}", MAX_RESULTS));

        let conn = self.pool.checkout()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), row_to_document)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        tracing::debug!(
            terms = terms.len(),
            language,
            hits = documents.len(),
            "document search"
        );
        Ok(documents)
    }

    /// Number of stored documents
    pub fn len(&self) -> Result<usize> {
        let conn = self.pool.checkout()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let tags_json: String = row.get(3)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    Ok(Document {
        doc_id: row.get(0)?,
        title: row.get(1)?,
        canonical_title: row.get(2)?,
        tags,
        snippet: row.get(4)?,
        s3_path: row.get(5)?,
        language: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, tags: &[&str], snippet: &str, language: &str) -> Document {
        Document::with_id(
            id.to_string(),
            title.to_string(),
            tags.iter().map(|s| s.to_string()).collect(),
            snippet.to_string(),
            format!("s3://legal-docs/{}.pdf", id),
            language.to_string(),
        )
    }

    fn seeded_store() -> DocumentStore {
        let store = DocumentStore::in_memory().unwrap();
        store
            .insert(&doc(
                "d1",
                "IP Assignment Agreement",
                &["contract", "template"],
                "Assignment of IP rights between parties.",
                "en",
            ))
            .unwrap();
        store
            .insert(&doc(
                "d2",
                "Rental Lease",
                &["lease"],
                "Residential lease agreement.",
                "en",
            ))
            .unwrap();
        store
            .insert(&doc(
                "d3",
                "Vertrag",
                &["contract"],
                "Dienstleistungsvertrag.",
                "de",
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_insert_and_get() {
        let store = DocumentStore::in_memory().unwrap();
        assert!(store.is_empty().unwrap());
        let d = doc("d1", "NDA Template", &["nda"], "Mutual NDA.", "en");
        store.insert(&d).unwrap();
        assert!(!store.is_empty().unwrap());

        let fetched = store.get("d1").unwrap().unwrap();
        assert_eq!(fetched, d);
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_is_validation_error() {
        let store = DocumentStore::in_memory().unwrap();
        let d = doc("d1", "NDA", &[], "", "en");
        store.insert(&d).unwrap();

        let err = store.insert(&d).unwrap_err();
        assert_eq!(err.category(), "validation");
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_insert_rejects_malformed_locator() {
        let store = DocumentStore::in_memory().unwrap();
        let mut d = doc("d1", "NDA", &[], "", "en");
        d.s3_path = "legal-docs/nda.pdf".to_string();
        assert_eq!(store.insert(&d).unwrap_err().category(), "validation");
    }

    #[test]
    fn test_update_and_delete_missing_target() {
        let store = DocumentStore::in_memory().unwrap();
        assert_eq!(
            store.update_snippet("nope", "x").unwrap_err().category(),
            "validation"
        );
        assert_eq!(store.delete("nope").unwrap_err().category(), "validation");
    }

    #[test]
    fn test_update_snippet() {
        let store = seeded_store();
        store.update_snippet("d2", "Updated lease terms.").unwrap();
        assert_eq!(store.get("d2").unwrap().unwrap().snippet, "Updated lease terms.");
    }

    #[test]
    fn test_delete_removes_row_and_tags() {
        let store = seeded_store();
        store.delete("d1").unwrap();
        assert!(store.get("d1").unwrap().is_none());
        // Tag probe no longer matches the deleted document
        let hits = store.search(&["contract".to_string()], "en").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_search_filters_by_language() {
        let store = seeded_store();
        let hits = store.search(&["contract".to_string()], "de").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "d3");
        for d in &hits {
            assert_eq!(d.language, "de");
        }
    }

    #[test]
    fn test_search_term_matches_title_snippet_or_tag() {
        let store = seeded_store();

        // substring of canonical title
        let by_title = store.search(&["assignment".to_string()], "en").unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].doc_id, "d1");

        // substring of snippet, case-insensitive
        let by_snippet = store.search(&["residential".to_string()], "en").unwrap();
        assert_eq!(by_snippet.len(), 1);
        assert_eq!(by_snippet[0].doc_id, "d2");

        // exact tag membership, case-insensitive
        let by_tag = store.search(&["CONTRACT".to_string()], "en").unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].doc_id, "d1");
    }

    #[test]
    fn test_search_snippet_match_folds_non_ascii_case() {
        let store = DocumentStore::in_memory().unwrap();
        store
            .insert(&doc(
                "d1",
                "Vorlagensammlung",
                &[],
                "MUSTERVERTRÄGE FÜR DIENSTLEISTUNGEN.",
                "de",
            ))
            .unwrap();

        let hits = store.search(&["verträge".to_string()], "de").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "d1");

        // The lowered column follows snippet updates
        store
            .update_snippet("d1", "ARBEITSVERTRÄGE UND KÜNDIGUNGEN.")
            .unwrap();
        let hits = store.search(&["kündigungen".to_string()], "de").unwrap();
        assert_eq!(hits.len(), 1);
        let gone = store.search(&["dienstleistungen".to_string()], "de").unwrap();
        assert!(gone.is_empty());
    }

    #[test]
    fn test_search_terms_are_conjunctive() {
        let store = seeded_store();
        let hits = store
            .search(&["contract".to_string(), "ip".to_string()], "en")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "d1");

        let none = store
            .search(&["contract".to_string(), "lease".to_string()], "en")
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_empty_terms_returns_language_slice() {
        let store = seeded_store();
        let hits = store.search(&[], "en").unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_caps_at_max_results() {
        let store = DocumentStore::in_memory().unwrap();
        for i in 0..30 {
            store
                .insert(&doc(
                    &format!("d{}", i),
                    &format!("Contract {}", i),
                    &["contract"],
                    "Standard contract.",
                    "en",
                ))
                .unwrap();
        }
        let hits = store.search(&["contract".to_string()], "en").unwrap();
        assert_eq!(hits.len(), MAX_RESULTS);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db");
        {
            let store = DocumentStore::open(&path).unwrap();
            store.insert(&doc("d1", "NDA", &[], "", "en")).unwrap();
        }
        let reopened = DocumentStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
    }
}
