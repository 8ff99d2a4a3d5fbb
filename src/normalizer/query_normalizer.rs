//! Query normalizer implementation
//!
//! Turns free-text legal drafting requests into structured search hints by
//! asking the oracle for strict JSON, stripping any code fences from the
//! reply, and parsing the remainder.

use super::{ChatMessage, OracleClient};
use crate::errors::{LexError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Instruction template sent with every normalization request
const SYSTEM_PROMPT: &str = r#"Convert the user's legal drafting request into a structured search hint JSON.

Return **only JSON**, no explanation.

The JSON must follow:
{
  "search_terms": ["list", "of", "important", "keywords"],
  "language": "en"
}
"#;

/// Default model used for normalization
const DEFAULT_MODEL: &str = "anthropic/claude-3.5-haiku";

/// Structured search hint produced by the oracle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedQuery {
    /// Keywords in oracle-provided relevance order
    pub search_terms: Vec<String>,
    /// Language code of the request
    pub language: String,
}

/// Seam over the oracle so tests can supply a deterministic stub
#[async_trait]
pub trait QueryOracle: Send + Sync {
    /// Normalize free text into search terms and a language code
    async fn normalize(&self, text: &str) -> Result<NormalizedQuery>;
}

/// Oracle-backed query normalizer
pub struct QueryNormalizer {
    client: OracleClient,
    model: String,
}

impl QueryNormalizer {
    /// Create a normalizer around an oracle client
    pub fn new(client: OracleClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set a custom model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get the model
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl QueryOracle for QueryNormalizer {
    async fn normalize(&self, text: &str) -> Result<NormalizedQuery> {
        if text.trim().is_empty() {
            return Err(LexError::validation("query", "query text is empty"));
        }

        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(text),
        ];

        let reply = self
            .client
            .chat_completion(&self.model, messages, 0.2, 256)
            .await
            .map_err(|e| LexError::Oracle(e.to_string()))?;

        let query = parse_reply(&reply)?;
        tracing::debug!(
            terms = query.search_terms.len(),
            language = %query.language,
            "normalized query"
        );
        Ok(query)
    }
}

/// Parse an oracle reply into a [`NormalizedQuery`], tolerating code fences
pub fn parse_reply(reply: &str) -> Result<NormalizedQuery> {
    let stripped = strip_code_fences(reply);
    serde_json::from_str(stripped).map_err(|e| LexError::Parse {
        reason: e.to_string(),
        raw: reply.to_string(),
    })
}

/// Strip a leading ``` or ```json fence and a trailing ``` fence
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
